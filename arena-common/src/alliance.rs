use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Alliance {
    #[derivative(Default)]
    Red,
    Blue,
}

#[cfg(test)]
mod test {
    use super::*;
    use enum_iterator::all;

    #[test]
    fn test_all_alliances() {
        let alliances: Vec<_> = all::<Alliance>().collect();
        assert_eq!(alliances, vec![Alliance::Red, Alliance::Blue]);
    }
}
