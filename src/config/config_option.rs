/// A configuration option: a value together with its name and permitted range.
#[derive(Clone)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub value: T,
}

impl<T: Copy> ConfigOption<T> {
    /// The minimum and maximum permitted values, for range messages.
    pub fn min_max(&self) -> (T, T) {
        (self.min, self.max)
    }
}
