use crate::error::Error;

/// A file embedded into the binary at compile time.
///
/// Usually implemented with `#[derive(Resource)]`, which also registers the
/// resource so [`find`] can see it.
pub trait Resource: 'static {
    const NAME: &'static str;
    const CONTENTS: &'static [u8];
}

/// A registered resource descriptor.
pub struct RegisteredResource {
    pub name: &'static str,
    pub contents: &'static [u8],
}

impl RegisteredResource {
    pub const fn new<R: Resource>() -> Self {
        Self {
            name: R::NAME,
            contents: R::CONTENTS,
        }
    }

    pub const fn from_bytes(name: &'static str, contents: &'static [u8]) -> Self {
        Self { name, contents }
    }
}

inventory::collect!(RegisteredResource);

/// Looks up a registered resource by name.
pub fn find(name: &str) -> Option<&'static RegisteredResource> {
    inventory::iter::<RegisteredResource>
        .into_iter()
        .find(|resource| resource.name == name)
}

pub(crate) fn require(name: &str) -> Result<&'static RegisteredResource, Error> {
    find(name).ok_or_else(|| Error::TemplateUnavailable(name.to_string()))
}

#[macro_export]
macro_rules! submit_resource {
    ($resource_type:ty) => {
        $crate::inventory::submit! {
            $crate::RegisteredResource::new::<$resource_type>()
        }
    };
    ($name:expr, $contents:expr) => {
        $crate::inventory::submit! {
            $crate::RegisteredResource::from_bytes($name, $contents)
        }
    };
}
