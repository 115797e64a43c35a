use crate::constants::sections::{CLASS_SEPARATOR, GROUP_PREFIX};

/// Parsed `group/<id>[#<class>]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef<'a> {
    pub id: &'a str,
    pub class_name: Option<&'a str>,
}

impl<'a> GroupRef<'a> {
    /// `None` unless `reference` starts with `group/` and has something after it
    pub fn parse(reference: &'a str) -> Option<Self> {
        let rest = reference.strip_prefix(GROUP_PREFIX).filter(|r| !r.is_empty())?;
        Some(match rest.split_once(CLASS_SEPARATOR) {
            Some((id, class_name)) => Self { id, class_name: Some(class_name) },
            None => Self { id: rest, class_name: None },
        })
    }
}

pub fn is_group_ref(reference: &str) -> bool {
    reference.starts_with(GROUP_PREFIX)
}

/// Module name with any `#class` suffix removed
pub fn bare_name(reference: &str) -> &str {
    reference
        .split_once(CLASS_SEPARATOR)
        .map_or(reference, |(name, _)| name)
}
