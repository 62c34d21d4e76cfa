//! Bracket matching and the shared bin/level block codec.

use std::sync::Arc;

use pts_chip::LayoutStrategy;

use crate::error::{DecodeError, Result};
use crate::model::{Bin, Level, is_framing_line, keys};

/// Net change in nesting depth for one trimmed line.
pub(crate) fn depth_delta(line: &str) -> i64 {
    let opens = line.matches('{').count() as i64;
    let closes = line.matches('}').count() as i64;
    opens - closes
}

/// Index of the line that closes the block opened at `start`.
pub(crate) fn find_block_end(lines: &[String], start: usize) -> Result<usize> {
    let mut depth = 0i64;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let trimmed = line.trim();
        depth += depth_delta(trimmed);
        if depth < 0 {
            return Err(DecodeError::UnexpectedClose {
                line: index,
                text: trimmed.to_string(),
            });
        }
        if depth == 0 {
            if index == start {
                return Err(DecodeError::MissingOpenBrace {
                    line: start,
                    text: trimmed.to_string(),
                });
            }
            return Ok(index);
        }
    }
    Err(DecodeError::Unterminated {
        line: start,
        text: lines[start].trim().to_string(),
    })
}

/// Bin id from its declaration: the trailing digit run once dashes and
/// braces are removed, or `position` when there is none.
pub(crate) fn parse_bin_id(declaration: &str, position: usize) -> u32 {
    let stripped: String = declaration
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '{')
        .collect();
    let stripped = stripped.trim();
    let digits_start = stripped
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(index, _)| index);

    digits_start
        .and_then(|start| stripped[start..].parse().ok())
        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX))
}

/// Decode one bin block. `block` runs from the declaration to the closing
/// line inclusive; `first_line` is the source index of the declaration.
pub(crate) fn decode_bin(block: &[String], position: usize, first_line: usize) -> Result<Bin> {
    let mut bin = Bin {
        id: parse_bin_id(&block[0], position),
        ..Bin::default()
    };

    let interior = &block[1..block.len().saturating_sub(1)];
    let mut depth = 0i64;
    let mut level_lines: Vec<String> = Vec::new();

    for (offset, raw) in interior.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let source_line = first_line + 1 + offset;
        let delta = depth_delta(line);

        if delta > 0 {
            if depth != 0 || delta > 1 {
                return Err(DecodeError::NestedLevel {
                    line: source_line,
                    text: line.to_string(),
                });
            }
            depth = 1;
            level_lines.clear();
        } else if delta < 0 {
            depth += delta;
            if depth < 0 {
                return Err(DecodeError::UnexpectedClose {
                    line: source_line,
                    text: line.to_string(),
                });
            }
            if !level_lines.is_empty() {
                bin.levels
                    .push(Arc::new(decode_level(std::mem::take(&mut level_lines))));
            }
        } else if depth == 0 {
            bin.header.push(line.to_string());
        } else {
            level_lines.push(line.to_string());
        }
    }

    if depth != 0 {
        return Err(DecodeError::Unterminated {
            line: first_line,
            text: block[0].trim().to_string(),
        });
    }
    Ok(bin)
}

/// Keep a level's property lines, dropping braces and the `reg` line.
pub(crate) fn decode_level(lines: Vec<String>) -> Level {
    Level::new(
        lines
            .into_iter()
            .filter(|line| depth_delta(line) == 0 && !line.contains('{') && !is_framing_line(line))
            .collect(),
    )
}

/// Emit one bin block, indented one tab per nesting level below `indent`.
pub(crate) fn encode_bin(
    bin: &Bin,
    strategy: &dyn LayoutStrategy,
    indent: &str,
    output: &mut Vec<String>,
) {
    output.push(format!("{indent}{}", strategy.bin_declaration(bin.id)));
    for line in &bin.header {
        output.push(format!("{indent}\t{line}"));
    }
    for (index, level) in bin.levels.iter().enumerate() {
        output.push(format!("{indent}\t{}@{index} {{", keys::LEVEL_NODE));
        output.push(format!("{indent}\t\t{} = <0x{index:02x}>;", keys::REG));
        for line in &level.lines {
            output.push(format!("{indent}\t\t{line}"));
        }
        output.push(format!("{indent}\t}};"));
    }
    output.push(format!("{indent}}};"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pts_chip::MultiBinLayout;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_bin_id() {
        assert_eq!(parse_bin_id("qcom,gpu-pwrlevels-0 {", 5), 0);
        assert_eq!(parse_bin_id("\tqcom,gpu-pwrlevels-12 {", 5), 12);
        assert_eq!(parse_bin_id("qcom,gpu-pwrlevels {", 3), 3);
    }

    #[test]
    fn test_find_block_end() {
        let source = lines("a {\n b {\n };\n};\nafter");
        assert_eq!(find_block_end(&source, 0), Ok(3));
        assert_eq!(find_block_end(&source, 1), Ok(2));
    }

    #[test]
    fn test_find_block_end_unterminated() {
        let source = lines("a {\n b {\n };");
        assert_eq!(
            find_block_end(&source, 0),
            Err(DecodeError::Unterminated {
                line: 0,
                text: "a {".to_string()
            })
        );
    }

    #[test]
    fn test_find_block_end_without_open_brace() {
        let source = lines("qcom,gpu-pwrlevels-0;");
        assert!(matches!(
            find_block_end(&source, 0),
            Err(DecodeError::MissingOpenBrace { line: 0, .. })
        ));
    }

    #[test]
    fn test_decode_bin() {
        let block = lines(
            "qcom,gpu-pwrlevels-1 {
\tqcom,speed-bin = <0x01>;
\tqcom,initial-pwrlevel = <0x01>;

\tqcom,gpu-pwrlevel@0 {
\t\treg = <0x00>;
\t\tqcom,gpu-freq = <0x2faf0800>;
\t};

\tqcom,gpu-pwrlevel@1 {
\t\treg = <0x01>;
\t\tqcom,gpu-freq = <0x1a524800>;
\t};
};",
        );
        let bin = decode_bin(&block, 0, 10).unwrap();

        assert_eq!(bin.id, 1);
        assert_eq!(
            bin.header,
            vec!["qcom,speed-bin = <0x01>;", "qcom,initial-pwrlevel = <0x01>;"]
        );
        assert_eq!(bin.levels.len(), 2);
        assert_eq!(bin.levels[0].lines, vec!["qcom,gpu-freq = <0x2faf0800>;"]);
        assert_eq!(bin.levels[1].frequency(), Some(441_600_000));
    }

    #[test]
    fn test_decode_bin_rejects_nested_level() {
        let block = lines(
            "qcom,gpu-pwrlevels-0 {
\tqcom,gpu-pwrlevel@0 {
\t\tinner {
\t\t};
\t};
};",
        );
        assert_eq!(
            decode_bin(&block, 0, 20),
            Err(DecodeError::NestedLevel {
                line: 22,
                text: "inner {".to_string()
            })
        );
    }

    #[test]
    fn test_encode_bin() {
        let bin = Bin {
            id: 2,
            header: vec!["qcom,initial-pwrlevel = <0x00>;".to_string()],
            levels: vec![Arc::new(Level::new(vec![
                "qcom,gpu-freq = <0x2faf0800>;".to_string(),
            ]))],
        };
        let mut output = Vec::new();
        encode_bin(&bin, &MultiBinLayout, "\t", &mut output);

        assert_eq!(
            output,
            vec![
                "\tqcom,gpu-pwrlevels-2 {",
                "\t\tqcom,initial-pwrlevel = <0x00>;",
                "\t\tqcom,gpu-pwrlevel@0 {",
                "\t\t\treg = <0x00>;",
                "\t\t\tqcom,gpu-freq = <0x2faf0800>;",
                "\t\t};",
                "\t};",
            ]
        );
    }
}
