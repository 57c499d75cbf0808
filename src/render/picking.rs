/// Screen-space polygons of everything drawn in the last frame, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickBuffer {
    entries: Vec<(usize, Vec<[f64; 2]>)>,
}

impl PickBuffer {
    pub fn push(&mut self, bin: usize, polygon: Vec<[f64; 2]>) {
        self.entries.push((bin, polygon));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Topmost bin under `p` (the last painted polygon that contains it).
    pub fn pick(&self, p: [f64; 2]) -> Option<usize> {
        self.entries
            .iter()
            .rev()
            .find(|(_, poly)| contains(poly, p))
            .map(|(bin, _)| *bin)
    }
}

pub fn contains(poly: &[[f64; 2]], p: [f64; 2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0] {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, s: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + s, y], [x + s, y + s], [x, y + s]]
    }

    #[test]
    fn point_in_square() {
        let sq = square(0.0, 0.0, 10.0);
        assert!(contains(&sq, [5.0, 5.0]));
        assert!(!contains(&sq, [15.0, 5.0]));
        assert!(!contains(&sq[..2], [0.5, 0.0]));
    }

    #[test]
    fn last_painted_wins() {
        let mut buf = PickBuffer::default();
        buf.push(0, square(0.0, 0.0, 10.0));
        buf.push(1, square(5.0, 5.0, 10.0));
        assert_eq!(buf.pick([7.0, 7.0]), Some(1));
        assert_eq!(buf.pick([2.0, 2.0]), Some(0));
        assert_eq!(buf.pick([50.0, 50.0]), None);
    }
}
