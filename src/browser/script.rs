//! Link-extraction script injected into every rendered page

/// Collects every element's `href` or `src` as an absolute URL.
///
/// Running inside the rendered DOM (after scripts executed) is what lets
/// the crawler see JavaScript-generated links that never appear in the
/// raw HTML.
pub const GET_LINKS: &str = r#"
function absolutePath(href) {
    try {
        var link = document.createElement("a");
        link.href = href;
        return link.href;
    } catch (error) {}
}
function getLinks() {
    var array = [];
    if (!document) return array;
    var allElements = document.querySelectorAll("*");
    for (var el of allElements) {
        if (el.href && typeof el.href === 'string') {
            array.push(el.href);
        } else if (el.src && typeof el.src === 'string') {
            var absolute = absolutePath(el.src);
            if (absolute) array.push(absolute);
        }
    }
    return array;
}
getLinks();
"#;
