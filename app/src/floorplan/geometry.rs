pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Accumulates the extent of a set of coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounds {
    extent: Option<(f64, f64, f64, f64)>,
}

impl Bounds {
    pub fn extend(&mut self, x: f64, y: f64) {
        self.extent = Some(match self.extent {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    pub fn extend_rect(&mut self, rect: &Rect) {
        self.extend(rect.min_x(), rect.min_y());
        self.extend(rect.max_x(), rect.max_y());
    }

    pub fn to_rect(&self) -> Option<Rect> {
        self.extent.map(|(min_x, min_y, max_x, max_y)| {
            Rect::new(point(min_x, min_y), Size::new(max_x - min_x, max_y - min_y))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn tokenize_path(d: &str) -> Vec<PathToken> {
    let mut tokens = vec![];
    let mut chars = d.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            tokens.push(PathToken::Command(c));
            chars.next();
        } else if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            let mut num = String::new();
            if c == '-' || c == '+' {
                num.push(c);
                chars.next();
            }
            while let Some(&n) = chars.peek() {
                // a second '.' or a sign starts the next number
                if n.is_ascii_digit()
                    || (n == '.' && !num.contains('.'))
                    || ((n == 'e' || n == 'E') && !num.contains('e') && !num.contains('E'))
                {
                    num.push(n);
                    chars.next();
                } else if (n == '-' || n == '+') && matches!(num.chars().last(), Some('e') | Some('E')) {
                    num.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            if let Ok(v) = num.parse::<f64>() {
                tokens.push(PathToken::Number(v));
            }
        } else {
            chars.next();
        }
    }

    tokens
}

/// Bounding box of SVG path data. Curve control points are included in
/// the box, so it can overhang tight curves slightly. Malformed data
/// yields the box of whatever parsed up to that point.
pub fn path_bounds(d: &str) -> Option<Rect> {
    let tokens = tokenize_path(d);
    let mut bounds = Bounds::default();

    let mut cursor = point(0.0, 0.0);
    let mut subpath_start = cursor;
    let mut i = 0;
    let mut command = 'M';

    fn number_at(tokens: &[PathToken], idx: usize) -> Option<f64> {
        match tokens.get(idx) {
            Some(PathToken::Number(v)) => Some(*v),
            _ => None,
        }
    }

    fn numbers_at<const N: usize>(tokens: &[PathToken], idx: usize) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for (offset, slot) in out.iter_mut().enumerate() {
            *slot = number_at(tokens, idx + offset)?;
        }
        Some(out)
    }

    while i < tokens.len() {
        if let PathToken::Command(c) = tokens[i] {
            command = c;
            i += 1;
            if command == 'Z' || command == 'z' {
                cursor = subpath_start;
            }
            continue;
        }

        let relative = command.is_ascii_lowercase();
        let origin = if relative { cursor } else { point(0.0, 0.0) };

        match command.to_ascii_uppercase() {
            'M' | 'L' | 'T' => {
                let Some([x, y]) = numbers_at::<2>(&tokens, i) else { break };
                cursor = point(origin.x + x, origin.y + y);
                bounds.extend(cursor.x, cursor.y);
                if command.to_ascii_uppercase() == 'M' {
                    subpath_start = cursor;
                    // coordinate pairs after a moveto continue as linetos
                    command = if relative { 'l' } else { 'L' };
                }
                i += 2;
            }
            'H' => {
                let Some(x) = number_at(&tokens, i) else { break };
                cursor = point(origin.x + x, cursor.y);
                bounds.extend(cursor.x, cursor.y);
                i += 1;
            }
            'V' => {
                let Some(y) = number_at(&tokens, i) else { break };
                cursor = point(cursor.x, origin.y + y);
                bounds.extend(cursor.x, cursor.y);
                i += 1;
            }
            'C' => {
                let Some(coords) = numbers_at::<6>(&tokens, i) else { break };
                for pair in coords.chunks_exact(2) {
                    bounds.extend(origin.x + pair[0], origin.y + pair[1]);
                }
                cursor = point(origin.x + coords[4], origin.y + coords[5]);
                i += 6;
            }
            'S' | 'Q' => {
                let Some(coords) = numbers_at::<4>(&tokens, i) else { break };
                for pair in coords.chunks_exact(2) {
                    bounds.extend(origin.x + pair[0], origin.y + pair[1]);
                }
                cursor = point(origin.x + coords[2], origin.y + coords[3]);
                i += 4;
            }
            'A' => {
                let Some(coords) = numbers_at::<7>(&tokens, i) else { break };
                cursor = point(origin.x + coords[5], origin.y + coords[6]);
                bounds.extend(cursor.x, cursor.y);
                i += 7;
            }
            _ => {
                // unknown command, skip over its parameters
                i += 1;
            }
        }
    }

    bounds.to_rect()
}

/// Bounding box of a polygon/polyline `points` attribute.
pub fn points_bounds(points: &str) -> Option<Rect> {
    let mut bounds = Bounds::default();
    let mut coords = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok());

    while let (Some(x), Some(y)) = (coords.next(), coords.next()) {
        bounds.extend(x, y);
    }

    bounds.to_rect()
}
