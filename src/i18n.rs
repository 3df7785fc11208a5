// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持波兰语（驾驶舱默认）、英文、中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 约束: 语言由调用方显式传入，不修改全局 locale
// ==========================================

/// 驾驶舱默认语言
pub const DEFAULT_LOCALE: &str = "pl";

/// 已提供翻译文件的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["pl", "en", "zh-CN"];

/// 规范化语言代码
///
/// "pl-PL" → "pl"，"en-US" → "en"，"zh"/"zh-cn" → "zh-CN"；
/// 未知语言回退到默认语言。
pub fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();
    if lower.starts_with("pl") {
        "pl"
    } else if lower.starts_with("en") {
        "en"
    } else if lower.starts_with("zh") {
        "zh-CN"
    } else {
        DEFAULT_LOCALE
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use production_kpi::i18n::t;
/// let msg = t("en", "common.success");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    let locale = normalize_locale(locale);
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数）
///
/// 占位符格式与翻译文件一致: `%{name}`
///
/// # 示例
/// ```no_run
/// use production_kpi::i18n::t_with_args;
/// let label = t_with_args("pl", "label.week", &[("weekday", "pt."), ("day", "1")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("pl-PL"), "pl");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("zh-cn"), "zh-CN");
        assert_eq!(normalize_locale("de-DE"), DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_simple() {
        assert_eq!(t("zh-CN", "common.success"), "操作成功");
        assert_eq!(t("en", "common.success"), "Operation successful");
        assert_eq!(t("pl-PL", "shift.night"), "Nocna");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_with_args("pl", "label.week", &[("weekday", "pt."), ("day", "1")]);
        assert_eq!(msg, "pt. 1");

        let msg = t_with_args("zh-CN", "label.month", &[("day", "15")]);
        assert_eq!(msg, "15日");
    }
}
