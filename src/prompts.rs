pub const ADVERTISEMENT_DESCRIPTION: &str =
    include_str!("../data/prompts/advertisement_description.txt");
pub const PRODUCT_IMAGE: &str = include_str!("../data/prompts/product_image.txt");
pub const PRICE_PREDICTION: &str = include_str!("../data/prompts/price_prediction.txt");
pub const SALES_POTENTIAL: &str = include_str!("../data/prompts/sales_potential.txt");
pub const SALES_HISTORY: &str = include_str!("../data/prompts/sales_history.txt");
pub const TRANSLATE: &str = include_str!("../data/prompts/translate.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Values are inserted verbatim; placeholders inside a value are not expanded.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    result.push_str(rest);
    result
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
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{{a}} {{b}}", &[("a", "x")]), "x {{b}}");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let rendered = render(
            PRODUCT_IMAGE,
            &[("prompt", "a vase labelled {{style}}"), ("style", "Madhubani")],
        );
        assert!(rendered.contains("a vase labelled {{style}}"));
        assert!(rendered.contains("Madhubani"));

        assert_eq!(
            render("{{a}}|{{b}}", &[("a", "{{b}}"), ("b", "{{a}}")]),
            "{{b}}|{{a}}"
        );
    }

    #[test]
    fn test_render_keeps_unclosed_braces() {
        assert_eq!(render("{{a}} {{oops", &[("a", "x")]), "x {{oops");
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(ADVERTISEMENT_DESCRIPTION.contains("{{artisan}}"));
        assert!(ADVERTISEMENT_DESCRIPTION.contains("{{categories}}"));
        assert!(PRODUCT_IMAGE.contains("{{prompt}}"));
        assert!(PRODUCT_IMAGE.contains("{{style}}"));
        assert!(PRICE_PREDICTION.contains("{{description}}"));
        for key in ["{{history}}", "{{name}}", "{{category}}", "{{price}}", "{{description}}"] {
            assert!(SALES_POTENTIAL.contains(key), "missing {}", key);
        }
        assert!(TRANSLATE.contains("{{language}}"));
        assert!(TRANSLATE.contains("{{texts}}"));
        assert!(!SALES_HISTORY.trim().is_empty());
    }
}
