use kurbo::{Point, Rect};

/// One step of a decoded geometry stream.
///
/// Arc commands in the binary form degrade to their chord, so the decoded
/// sequence never carries arcs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    Close,
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
}

const CMD_CLOSE: u8 = 0;
const CMD_MOVE: u8 = 1;
const CMD_LINE: u8 = 2;
const CMD_QUAD: u8 = 3;
const CMD_CUBIC: u8 = 4;
const CMD_ARC: u8 = 5;

/// Decode a binary command stream: `(cmd: u8, args: f32...)` pairs.
///
/// Unknown command codes and truncated argument runs terminate decoding
/// without error; geometry problems are never fatal.
pub(crate) fn decode_command_blob(bytes: &[u8]) -> Vec<PathCommand> {
    let mut out = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let cmd = bytes[pos];
        pos += 1;
        let argc = match cmd {
            CMD_CLOSE => 0,
            CMD_MOVE | CMD_LINE => 2,
            CMD_QUAD | CMD_ARC => 4,
            CMD_CUBIC => 6,
            _ => break,
        };
        if bytes.len() - pos < argc * 4 {
            break;
        }
        let mut args = [0.0f64; 6];
        for slot in args.iter_mut().take(argc) {
            let b = &bytes[pos..pos + 4];
            *slot = f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]]));
            pos += 4;
        }
        out.push(match cmd {
            CMD_CLOSE => PathCommand::Close,
            CMD_MOVE => PathCommand::MoveTo(Point::new(args[0], args[1])),
            CMD_LINE => PathCommand::LineTo(Point::new(args[0], args[1])),
            CMD_QUAD => PathCommand::QuadTo(
                Point::new(args[0], args[1]),
                Point::new(args[2], args[3]),
            ),
            CMD_CUBIC => PathCommand::CubicTo(
                Point::new(args[0], args[1]),
                Point::new(args[2], args[3]),
                Point::new(args[4], args[5]),
            ),
            // Two-point arc: keep the endpoint, drop the curvature.
            CMD_ARC => PathCommand::LineTo(Point::new(args[2], args[3])),
            _ => unreachable!(),
        });
    }
    out
}

enum Token {
    Letter(char),
    Number(f64),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut num = String::new();
    let mut flush = |num: &mut String, tokens: &mut Vec<Token>| {
        if !num.is_empty() {
            if let Ok(v) = num.parse::<f64>() {
                tokens.push(Token::Number(v));
            }
            num.clear();
        }
    };
    for c in text.chars() {
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            flush(&mut num, &mut tokens);
            tokens.push(Token::Letter(c.to_ascii_uppercase()));
        } else if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
            num.push(c);
        } else if c == '-' || c == '+' {
            // A sign starts a new number unless it follows an exponent.
            if !num.ends_with(['e', 'E']) {
                flush(&mut num, &mut tokens);
            }
            num.push(c);
        } else {
            flush(&mut num, &mut tokens);
        }
    }
    flush(&mut num, &mut tokens);
    tokens
}

/// Parse the interleaved textual command form (`M`/`L`/`Q`/`C`/`Z` with
/// numeric operands; a run of operands repeats the preceding letter, and a
/// repeated `M` continues as `L`).
pub(crate) fn parse_command_text(text: &str) -> Vec<PathCommand> {
    let tokens = tokenize(text);
    let mut out = Vec::new();
    let mut op: Option<char> = None;
    let mut i = 0usize;

    let number = |i: &mut usize| -> Option<f64> {
        match tokens.get(*i) {
            Some(Token::Number(v)) => {
                *i += 1;
                Some(*v)
            }
            _ => None,
        }
    };

    while i < tokens.len() {
        if let Token::Letter(c) = tokens[i] {
            op = Some(c);
            i += 1;
            if c == 'Z' {
                out.push(PathCommand::Close);
                op = None;
            }
            continue;
        }

        let Some(letter) = op else { return out };
        match letter {
            'M' | 'L' => {
                let Some(x) = number(&mut i) else { return out };
                let Some(y) = number(&mut i) else { return out };
                let p = Point::new(x, y);
                out.push(if letter == 'M' {
                    PathCommand::MoveTo(p)
                } else {
                    PathCommand::LineTo(p)
                });
                if letter == 'M' {
                    op = Some('L');
                }
            }
            'Q' => {
                let Some(cx) = number(&mut i) else { return out };
                let Some(cy) = number(&mut i) else { return out };
                let Some(x) = number(&mut i) else { return out };
                let Some(y) = number(&mut i) else { return out };
                out.push(PathCommand::QuadTo(Point::new(cx, cy), Point::new(x, y)));
            }
            'C' => {
                let Some(c1x) = number(&mut i) else { return out };
                let Some(c1y) = number(&mut i) else { return out };
                let Some(c2x) = number(&mut i) else { return out };
                let Some(c2y) = number(&mut i) else { return out };
                let Some(x) = number(&mut i) else { return out };
                let Some(y) = number(&mut i) else { return out };
                out.push(PathCommand::CubicTo(
                    Point::new(c1x, c1y),
                    Point::new(c2x, c2y),
                    Point::new(x, y),
                ));
            }
            _ => return out,
        }
    }
    out
}

/// Sweep endpoints and control points into an axis-aligned bound.
///
/// Control points are included on purpose: the renderer wants a stable box
/// to scale against, not the tight curve extent.
pub(crate) fn command_bounds(cmds: &[PathCommand]) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    let mut add = |p: Point| {
        bounds = Some(match bounds {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    };
    for cmd in cmds {
        match *cmd {
            PathCommand::Close => {}
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => add(p),
            PathCommand::QuadTo(c, p) => {
                add(c);
                add(p);
            }
            PathCommand::CubicTo(c1, c2, p) => {
                add(c1);
                add(c2);
                add(p);
            }
        }
    }
    bounds
}

/// True when the sequence draws something beyond a lone move-to.
pub(crate) fn has_drawable(cmds: &[PathCommand]) -> bool {
    cmds.iter()
        .any(|c| !matches!(c, PathCommand::MoveTo(_) | PathCommand::Close))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
