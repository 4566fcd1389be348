use crate::alliance::Alliance;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// One value per alliance
#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedBlueBundle<T> {
    pub red: T,
    pub blue: T,
}

impl<T> RedBlueBundle<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Alliance, &T)> {
        self.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RedBlueBundle<T> {
    type Item = (Alliance, &'a T);
    type IntoIter = std::array::IntoIter<Self::Item, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Alliance::Red, &self.red), (Alliance::Blue, &self.blue)].into_iter()
    }
}

impl<T> IntoIterator for RedBlueBundle<T> {
    type Item = (Alliance, T);
    type IntoIter = std::array::IntoIter<Self::Item, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Alliance::Red, self.red), (Alliance::Blue, self.blue)].into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_iter_order() {
        let bundle = RedBlueBundle {
            red: "r".to_string(),
            blue: "b".to_string(),
        };
        let collected: Vec<_> = bundle.iter().map(|(a, v)| (a, v.as_str())).collect();
        assert_eq!(collected, vec![(Alliance::Red, "r"), (Alliance::Blue, "b")]);

        let owned: Vec<_> = bundle.into_iter().collect();
        assert_eq!(
            owned,
            vec![
                (Alliance::Red, "r".to_string()),
                (Alliance::Blue, "b".to_string())
            ]
        );
    }
}
