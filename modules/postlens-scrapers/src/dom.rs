use scraper::ElementRef;

/// Concatenated text content of an element, whitespace-trimmed.
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// First non-empty text node of an element. Approximates the first rendered
/// line for markup that stacks display name, handle, and metadata inside
/// one container.
pub(crate) fn first_text_line(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or("")
        .to_string()
}
