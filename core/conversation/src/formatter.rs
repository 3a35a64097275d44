//! Reply markup.

/// How a raw reply is turned into the markup the host renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyFormat {
    /// Return the reply unchanged; used when the prompt already asks for HTML.
    #[default]
    PassThrough,
    /// Treat the reply as plain text and convert it to HTML.
    Html,
}

impl ReplyFormat {
    pub fn format(self, raw: &str) -> String {
        match self {
            ReplyFormat::PassThrough => raw.to_string(),
            ReplyFormat::Html => text_to_html(raw),
        }
    }
}

/// Convert plain text to HTML.
///
/// `&`, `<` and `>` are escaped, blank-line separated blocks become `<p>`
/// paragraphs and remaining line breaks become `<br>`.
pub fn text_to_html(raw: &str) -> String {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let mut html = String::with_capacity(raw.len() + paragraphs.len() * 7);
    for paragraph in paragraphs {
        html.push_str("<p>");
        for (i, line) in paragraph.into_iter().enumerate() {
            if i > 0 {
                html.push_str("<br>");
            }
            escape_into(&mut html, line);
        }
        html.push_str("</p>");
    }
    html
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "formatter.test.rs"]
mod tests;
