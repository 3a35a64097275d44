use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_pass_through_is_identity() {
    let raw = "<ul><li>Fireball</li></ul>\n";
    assert_eq!(ReplyFormat::PassThrough.format(raw), raw);
    assert_eq!(ReplyFormat::default(), ReplyFormat::PassThrough);
}

#[test]
fn test_paragraphs_and_line_breaks() {
    let raw = "Roll initiative.\nThen act in order.\n\n\nThe goblin flees.";
    assert_eq!(
        ReplyFormat::Html.format(raw),
        "<p>Roll initiative.<br>Then act in order.</p><p>The goblin flees.</p>"
    );
}

#[test]
fn test_escapes_markup_characters() {
    assert_eq!(
        text_to_html("AC < 15 && HP > 0"),
        "<p>AC &lt; 15 &amp;&amp; HP &gt; 0</p>"
    );
}

#[test]
fn test_windows_line_endings_and_blank_input() {
    assert_eq!(text_to_html("a\r\nb\r\n\r\nc"), "<p>a<br>b</p><p>c</p>");
    assert_eq!(text_to_html(""), "");
    assert_eq!(text_to_html(" \n\n "), "");
}
