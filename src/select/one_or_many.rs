/// What a getter on [`Elements`](crate::select::Elements) returns: nothing for an empty collection, a single value for
/// a one-member collection, or one value per member, in member order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OneOrMany<T> {
    Empty,
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn from_vec(mut values: Vec<T>) -> Self {
        match values.len() {
            0 => Self::Empty,
            1 => match values.pop() {
                Some(only) => Self::One(only),
                None => Self::Empty,
            },
            _ => Self::Many(values),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// The value, if there was exactly one.
    pub fn one(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Empty | Self::Many(_) => None,
        }
    }

    pub fn first(&self) -> Option<&T> {
        match self {
            Self::Empty => None,
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    pub fn map<U, F>(self, f: F) -> OneOrMany<U>
    where
        F: FnMut(T) -> U,
    {
        OneOrMany::from_vec(self.into_vec().into_iter().map(f).collect())
    }
}

impl<T> FromIterator<T> for OneOrMany<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}
