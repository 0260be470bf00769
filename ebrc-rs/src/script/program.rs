//! Navigation over an encoded function body.

use crate::preprocess::{Line, LineKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Index of the line that balances the control line at `ip`.
///
/// Scanning forward from a block opener (or an else) finds its else or its
/// close; scanning backward from a close finds its opener, or the else of
/// an if/else.  Inner blocks are skipped by counting opens and closes.
/// An unbalanced body yields `body.len()` forward and `0` backward.
pub fn balance(body: &[Line], ip: usize, direction: Direction) -> usize {
    let step: isize = match direction {
        Direction::Forward => 1,
        Direction::Backward => -1,
    };
    let mut nest: isize = 0;
    let mut i = ip;

    loop {
        match direction {
            Direction::Forward => {
                i += 1;
                if i >= body.len() {
                    return body.len();
                }
            }
            Direction::Backward => {
                if i == 0 {
                    return 0;
                }
                i -= 1;
            }
        }
        match body[i].kind {
            LineKind::Else if nest == 0 => return i,
            LineKind::Else | LineKind::Text(_) => {}
            LineKind::Open(_) => nest += step,
            LineKind::Close => nest -= step,
        }
        if nest < 0 {
            return i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::encode;

    fn body(src: &str) -> Vec<Line> {
        encode(src, "test").unwrap()
    }

    #[test]
    fn forward_finds_close_or_else() {
        // 0 if, 1 a, 2 loop, 3 b, 4 close, 5 else, 6 c, 7 close
        let b = body("if(*){\na\nloop(2){\nb\n}\n}else{\nc\n}\n");
        assert_eq!(balance(&b, 0, Direction::Forward), 5);
        assert_eq!(balance(&b, 2, Direction::Forward), 4);
        assert_eq!(balance(&b, 5, Direction::Forward), 7);
    }

    #[test]
    fn backward_finds_opener() {
        let b = body("while(*){\nloop(2){\nb\n}\nc\n}\n");
        assert_eq!(balance(&b, 5, Direction::Backward), 0);
        assert_eq!(balance(&b, 3, Direction::Backward), 1);
    }

    #[test]
    fn unbalanced_body_stops_at_edges() {
        let b = body("if(*){\na\n");
        assert_eq!(balance(&b, 0, Direction::Forward), 2);
        let b = body("a\n}\n");
        assert_eq!(balance(&b, 1, Direction::Backward), 0);
    }
}
