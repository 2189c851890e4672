pub const SYSTEM: &str = include_str!("../data/prompts/system.txt");
pub const STYLE_TRANSFER: &str = include_str!("../data/prompts/style_transfer.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.trim().to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Style-transfer instruction for the given target style.
pub fn style_instruction(style: &str) -> String {
    render(STYLE_TRANSFER, &[("style", style)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_trims_template() {
        assert_eq!(render("  {{a}}\n", &[("a", "cats")]), "cats");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!SYSTEM.trim().is_empty());
        assert!(!STYLE_TRANSFER.trim().is_empty());
    }

    #[test]
    fn test_style_transfer_has_style_placeholder() {
        assert!(STYLE_TRANSFER.contains("{{style}}"));
    }

    #[test]
    fn test_style_instruction_keeps_subject_and_background() {
        let text = style_instruction("Studio Ghibli");
        assert!(text.contains("Studio Ghibli"));
        assert!(text.contains("subject"));
        assert!(text.contains("background"));
        assert!(!text.contains("{{"));
    }
}
