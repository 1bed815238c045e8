use bitflags::bitflags;

use portc_core::Visibility;

bitflags! {
    /// Declaration modifiers as written in source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const VIRTUAL = 1 << 4;
        const OVERRIDE = 1 << 5;
        const ABSTRACT = 1 << 6;
    }
}

impl Modifiers {
    pub const VISIBILITY: Modifiers = Modifiers::PUBLIC
        .union(Modifiers::PRIVATE)
        .union(Modifiers::PROTECTED);

    pub const DISPATCH: Modifiers = Modifiers::VIRTUAL
        .union(Modifiers::OVERRIDE)
        .union(Modifiers::ABSTRACT);

    /// Declared visibility; members default to private.
    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Private
        }
    }

    /// Source keyword of a single-flag value.
    pub fn keyword(self) -> &'static str {
        const NAMES: [(Modifiers, &str); 7] = [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::STATIC, "static"),
            (Modifiers::VIRTUAL, "virtual"),
            (Modifiers::OVERRIDE, "override"),
            (Modifiers::ABSTRACT, "abstract"),
        ];
        NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or("modifier", |(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_visibility_is_private() {
        assert_eq!(Modifiers::empty().visibility(), Visibility::Private);
        assert_eq!(
            (Modifiers::PUBLIC | Modifiers::STATIC).visibility(),
            Visibility::Public
        );
    }

    #[test]
    fn dispatch_group() {
        assert!(Modifiers::DISPATCH.contains(Modifiers::OVERRIDE));
        assert!(!Modifiers::DISPATCH.contains(Modifiers::STATIC));
    }
}
