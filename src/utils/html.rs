/// Clean authored text using the ammonia library.
///
/// Test titles, descriptions, questions and options are typed by staff and
/// rendered to students. Safe markup (like <b>, <p>) is preserved while
/// dangerous tags (like <script>, <iframe>) and event attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Cleans and trims a piece of authored text.
pub fn clean_text(input: &str) -> String {
    clean_html(input.trim()).trim().to_string()
}
