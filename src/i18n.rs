// ==========================================
// 包装物料 BOM 系统 - 界面语言
// ==========================================
// 职责: 语言切换（归一化到已有的 locale 文件）、消息查找与 %{k} 占位符填充
// 红线: 未知语言一律退回西班牙语
// ==========================================

/// 已提供翻译文件的语言（第一个为默认）
pub const SUPPORTED_LOCALES: [&str; 2] = ["es", "en"];

/// 语言代码归一化："en-US" / "EN" → "en"，未知 → "es"
pub fn normalize_locale(locale: &str) -> &'static str {
    let primary = locale
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| *l == primary)
        .unwrap_or(SUPPORTED_LOCALES[0])
}

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言，返回实际生效的语言代码
pub fn set_locale(locale: &str) -> &'static str {
    let effective = normalize_locale(locale);
    rust_i18n::set_locale(effective);
    effective
}

/// 查找消息
///
/// ```no_run
/// let msg = packaging_bom::i18n::t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 查找消息并填充 %{name} 占位符
///
/// ```no_run
/// use packaging_bom::i18n::t_with_args;
/// let msg = t_with_args("assembly.supply_code_required", &[("category", "Fleje")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill(t(key), args)
}

fn fill(template: String, args: &[(&str, &str)]) -> String {
    args.iter().fold(template, |text, (name, value)| {
        text.replace(&format!("%{{{name}}}"), value)
    })
}
