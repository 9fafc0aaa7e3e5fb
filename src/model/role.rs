#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Supervisor = 2,
    Guard = 3,
    System = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Supervisor),
            3 => Some(Role::Guard),
            4 => Some(Role::System),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_map_to_roles() {
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::Supervisor));
        assert_eq!(Role::from_id(3), Some(Role::Guard));
        assert_eq!(Role::from_id(4), Some(Role::System));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(5), None);
        assert_eq!(Role::from_id(255), None);
    }
}
