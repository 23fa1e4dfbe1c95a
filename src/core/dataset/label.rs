//! YOLO label text handling.
//!
//! A label file holds one detection per line, `class_id x y w h` for boxes or
//! `class_id x1 y1 x2 y2 ...` for polygons. Lines starting with `#` carry
//! metadata and are never rewritten.

/// How a single label line was interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelLine<'a> {
    Blank,
    Comment,
    Detection { class_id: u32, rest: Vec<&'a str> },
    /// Non-empty line whose first token is not a class index.
    Unparsed,
}

pub fn parse_label_line(line: &str) -> LabelLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LabelLine::Blank;
    }
    if trimmed.starts_with('#') {
        return LabelLine::Comment;
    }

    let mut tokens = trimmed.split_whitespace();
    match tokens.next().map(str::parse::<u32>) {
        Some(Ok(class_id)) => LabelLine::Detection {
            class_id,
            rest: tokens.collect(),
        },
        _ => LabelLine::Unparsed,
    }
}

/// Replace class `from` with `to` in every detection line of `content`.
///
/// Matching lines are re-joined with single spaces and end in `\n`; every
/// other line is kept byte-for-byte. Returns the new text and the number of
/// lines changed.
pub fn remap_class(content: &str, from: u32, to: u32) -> (String, usize) {
    let mut output = String::with_capacity(content.len());
    let mut changed = 0;

    for line in content.split_inclusive('\n') {
        match parse_label_line(line) {
            LabelLine::Detection { class_id, rest } if class_id == from => {
                output.push_str(&to.to_string());
                for token in rest {
                    output.push(' ');
                    output.push_str(token);
                }
                output.push('\n');
                changed += 1;
            }
            _ => output.push_str(line),
        }
    }

    (output, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detection_line() {
        match parse_label_line("1 0.5 0.5 0.2 0.3\n") {
            LabelLine::Detection { class_id, rest } => {
                assert_eq!(class_id, 1);
                assert_eq!(rest, vec!["0.5", "0.5", "0.2", "0.3"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_comment_and_blank() {
        assert_eq!(
            parse_label_line("# Resolution: 2560x1440, Map: de_dust2"),
            LabelLine::Comment
        );
        assert_eq!(parse_label_line("   \n"), LabelLine::Blank);
        assert_eq!(parse_label_line("car 0.1 0.1"), LabelLine::Unparsed);
    }

    #[test]
    fn test_remap_only_touches_matching_class() {
        let content = "# meta\n1 0.1  0.2 0.3 0.4\n2 0.5 0.5 0.1 0.1\n1 0.9 0.9 0.1 0.1";
        let (out, changed) = remap_class(content, 1, 0);
        assert_eq!(changed, 2);
        assert_eq!(
            out,
            "# meta\n0 0.1 0.2 0.3 0.4\n2 0.5 0.5 0.1 0.1\n0 0.9 0.9 0.1 0.1\n"
        );
    }

    #[test]
    fn test_remap_without_matches_is_identity() {
        let content = "0 0.1 0.2 0.3 0.4\n";
        let (out, changed) = remap_class(content, 1, 0);
        assert_eq!(changed, 0);
        assert_eq!(out, content);
    }
}
