use crate::parsers::html;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_link() {
        let markup = "<html><head><title>Jane</title></head><body><p>Hello, world!</p><a href=\"https://example.com\">Link</a></body></html>";
        assert_eq!(
            html::normalize(markup),
            "Hello, world!\n\n[Link](https://example.com)"
        );
    }

    #[test]
    fn test_noise_is_stripped() {
        let markup = concat!(
            "<body>",
            "<script>var a = \"<p>tracking</p>\";</script>",
            "<p>Hi <img src=\"data:image/png;base64,iVBORw0KGgo=\"> there</p>",
            "<a href=\"/cat.jpg\">cat photo</a>",
            "<a href=\"/about\">About me</a>",
            "</body>"
        );
        let text = html::normalize(markup);
        assert_eq!(text, "Hi there\n\n[About me](/about)");
        assert!(!text.contains("tracking"));
        assert!(!text.contains("base64"));
        assert!(!text.contains("cat photo"));
    }

    #[test]
    fn test_head_removed_but_header_kept() {
        let markup = "<html><head><meta name=\"x\"><style>p{}</style></head><body><header>Jane's Studio</header></body></html>";
        assert_eq!(html::normalize(markup), "Jane's Studio");
    }

    #[test]
    fn test_headings_and_lists() {
        let markup = "<body><h2>About</h2><ul><li>One</li><li>Two</li></ul></body>";
        assert_eq!(html::normalize(markup), "## About\n\n- One\n- Two");
    }

    #[test]
    fn test_href_escaped_for_recovery() {
        let markup = "<body><a href=\"/my page (1)\">x</a></body>";
        assert_eq!(html::normalize(markup), "[x](/my%20page%20%281%29)");
    }

    #[test]
    fn test_anchor_without_label_uses_target() {
        let markup = "<body><a href=\"/contact\"><span> </span></a></body>";
        assert_eq!(html::normalize(markup), "[/contact](/contact)");
    }

    #[test]
    fn test_javascript_anchor_keeps_text_only() {
        let markup = "<body><a href=\"javascript:void(0)\">Menu</a></body>";
        assert_eq!(html::normalize(markup), "Menu");
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let markup = "<div><p>Unclosed <a href=\"/x\">link <b>bold";
        let text = html::normalize(markup);
        assert!(text.contains("Unclosed"));
        assert!(text.contains("(/x)"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html::normalize(""), "");
    }

    #[test]
    fn test_normalization_is_repeatable() {
        let markup = "<body><nav><a href=\"/\">Home</a> | <a href=\"/shop\">Shop</a></nav><p>Welcome   to my\n\n studio</p></body>";
        let first = html::normalize(markup);
        let second = html::normalize(markup);
        assert_eq!(first, second);
        assert_eq!(first, "[Home](/) | [Shop](/shop)\n\nWelcome to my studio");
    }
}
