//! Publication flags shared by every exportable entity.
//!
//! The flag is tri-state on input: records resolved from older data may not
//! carry it at all. An entity is *unpublished* only when the flag is
//! explicitly `false`; digital objects and file versions are stricter and
//! count as *published* only when the flag is explicitly `true`.

/// Access to an entity's publish flag.
pub trait Visibility {
    fn publish_flag(&self) -> Option<bool>;

    /// True when the entity was explicitly marked unpublished.
    fn is_unpublished(&self) -> bool {
        self.publish_flag() == Some(false)
    }

    /// True only when the entity was explicitly marked published.
    fn is_explicitly_published(&self) -> bool {
        self.publish_flag() == Some(true)
    }

    /// Whether the entity survives a run with the given unpublished policy.
    fn is_visible(&self, include_unpublished: bool) -> bool {
        include_unpublished || !self.is_unpublished()
    }
}

macro_rules! impl_visibility {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Visibility for $ty {
                fn publish_flag(&self) -> Option<bool> {
                    self.publish
                }
            }
        )+
    };
}

pub(crate) use impl_visibility;
