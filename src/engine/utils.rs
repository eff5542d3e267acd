use crate::types::Coord;

pub(crate) fn manhattan(a: Coord, b: Coord) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_handles_off_board_targets() {
        assert_eq!(manhattan(Coord::new(0, 0), Coord::new(3, 4)), 7);
        assert_eq!(manhattan(Coord::new(1, 17), Coord::new(-2, 17)), 3);
    }
}
