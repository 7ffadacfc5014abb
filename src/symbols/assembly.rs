//! Assembly identity and friend-assembly grants.

use smol_str::SmolStr;

/// The identity of an assembly plus the access grants it declares.
///
/// A grant ("grant internal access to N") is declared by the *producer*
/// assembly and names a consumer; the consumer declares nothing. Friendship
/// is therefore asymmetric, and [`AssemblyIdentity::grants_access_to`] is
/// always asked of the symbol's own assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyIdentity {
    /// Simple name, e.g. `"Core"`.
    pub name: SmolStr,
    /// Strong-name public key, if the assembly is signed.
    pub public_key: Option<Vec<u8>>,
    /// Consumers this assembly grants internal access to.
    friends: Vec<FriendGrant>,
}

/// One declared "grant internal access" entry.
#[derive(Clone, Debug, PartialEq, Eq)]
struct FriendGrant {
    name: SmolStr,
    /// Required consumer key; a keyless grant accepts any key.
    public_key: Option<Vec<u8>>,
}

impl AssemblyIdentity {
    /// Create an unsigned identity with no grants.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            public_key: None,
            friends: Vec::new(),
        }
    }

    /// Attach a strong-name public key.
    pub fn with_public_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    /// Declare a friend assembly by name.
    pub fn granting_access_to(mut self, name: impl Into<SmolStr>) -> Self {
        self.friends.push(FriendGrant {
            name: name.into(),
            public_key: None,
        });
        self
    }

    /// Declare a friend assembly by name and required public key.
    pub fn granting_keyed_access_to(
        mut self,
        name: impl Into<SmolStr>,
        key: impl Into<Vec<u8>>,
    ) -> Self {
        self.friends.push(FriendGrant {
            name: name.into(),
            public_key: Some(key.into()),
        });
        self
    }

    /// Does this assembly grant internal access to `consumer`?
    pub fn grants_access_to(&self, consumer: &AssemblyIdentity) -> bool {
        self.friends.iter().any(|grant| {
            grant.name == consumer.name
                && match &grant.public_key {
                    Some(required) => consumer.public_key.as_deref() == Some(required.as_slice()),
                    None => true,
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_by_name() {
        let producer = AssemblyIdentity::new("Core").granting_access_to("Tests");
        let consumer = AssemblyIdentity::new("Tests");
        let stranger = AssemblyIdentity::new("Other");

        assert!(producer.grants_access_to(&consumer));
        assert!(!producer.grants_access_to(&stranger));
    }

    #[test]
    fn test_grant_is_one_way() {
        let producer = AssemblyIdentity::new("Core").granting_access_to("Tests");
        let consumer = AssemblyIdentity::new("Tests");

        // The consumer never implicitly grants back.
        assert!(!consumer.grants_access_to(&producer));
    }

    #[test]
    fn test_keyed_grant_requires_matching_key() {
        let producer =
            AssemblyIdentity::new("Core").granting_keyed_access_to("Tests", vec![1, 2, 3]);

        let signed = AssemblyIdentity::new("Tests").with_public_key(vec![1, 2, 3]);
        let wrong_key = AssemblyIdentity::new("Tests").with_public_key(vec![9]);
        let unsigned = AssemblyIdentity::new("Tests");

        assert!(producer.grants_access_to(&signed));
        assert!(!producer.grants_access_to(&wrong_key));
        assert!(!producer.grants_access_to(&unsigned));
    }
}
