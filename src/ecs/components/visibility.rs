/// Whether an entity should be rendered.
///
/// Hidden entities keep their transform and components; they are only
/// skipped when the draw list is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility(pub bool);

impl Visibility {
    /// Entity is rendered.
    pub const VISIBLE: Self = Self(true);
    /// Entity is skipped by the render iteration.
    pub const HIDDEN: Self = Self(false);

    pub fn is_visible(self) -> bool {
        self.0
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::VISIBLE
    }
}
