use crate::serial::protocol::SortCommand;

/// One of the two tracked model classes (label index 0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortClass {
    First,
    Second,
}

impl SortClass {
    pub fn index(&self) -> usize {
        match self {
            SortClass::First => 0,
            SortClass::Second => 1,
        }
    }

    /// The byte sent to the sorter is tied to the class, not to the screen side.
    pub fn command(&self) -> SortCommand {
        match self {
            SortClass::First => SortCommand::Left,
            SortClass::Second => SortCommand::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortSide {
    Left,
    Right,
}

/// Which screen side shows which class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideMapping {
    swap: bool,
}

impl SideMapping {
    pub fn new(swap: bool) -> Self {
        Self { swap }
    }

    pub fn side_of(&self, class: SortClass) -> SortSide {
        match (class, self.swap) {
            (SortClass::First, false) | (SortClass::Second, true) => SortSide::Left,
            (SortClass::Second, false) | (SortClass::First, true) => SortSide::Right,
        }
    }

    pub fn class_on(&self, side: SortSide) -> SortClass {
        match (side, self.swap) {
            (SortSide::Left, false) | (SortSide::Right, true) => SortClass::First,
            (SortSide::Right, false) | (SortSide::Left, true) => SortClass::Second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_puts_first_class_on_the_left() {
        let mapping = SideMapping::default();
        assert_eq!(mapping.side_of(SortClass::First), SortSide::Left);
        assert_eq!(mapping.class_on(SortSide::Right), SortClass::Second);
    }

    #[test]
    fn swapping_moves_both_classes_but_keeps_their_bytes() {
        let mapping = SideMapping::new(true);
        assert_eq!(mapping.side_of(SortClass::First), SortSide::Right);
        assert_eq!(mapping.class_on(SortSide::Left), SortClass::Second);
        assert_eq!(SortClass::First.command().byte(), b'1');
    }
}
