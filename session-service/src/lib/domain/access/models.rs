use std::fmt;

/// A named rule an endpoint declares as sufficient for access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Caller owns the target resource
    Own,
    /// Caller holds an active enrollment in the target resource
    Enrolled,
    /// Caller has the admin role
    Admin,
    /// Always passes; skips authentication
    Public,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Own => "own",
            Policy::Enrolled => "enrolled",
            Policy::Admin => "admin",
            Policy::Public => "public",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policies declared on one endpoint; satisfied if any member is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySet(Vec<Policy>);

impl PolicySet {
    pub fn new(policies: &[Policy]) -> Self {
        let mut set = Vec::with_capacity(policies.len());
        for policy in policies {
            if !set.contains(policy) {
                set.push(*policy);
            }
        }
        Self(set)
    }

    pub fn contains(&self, policy: Policy) -> bool {
        self.0.contains(&policy)
    }

    pub fn is_public(&self) -> bool {
        self.contains(Policy::Public)
    }
}

impl fmt::Display for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Policy::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Kind of resource a guarded endpoint targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Course,
    User,
}

impl ResourceKind {
    /// Path, body and query key naming this kind's id, e.g. `course_id`.
    pub fn id_field(&self) -> &'static str {
        match self {
            ResourceKind::Course => "course_id",
            ResourceKind::User => "user_id",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Course => f.write_str("course"),
            ResourceKind::User => f.write_str("user"),
        }
    }
}

/// Raw reference to a guarded resource as extracted from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// The policy that let a request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGrant {
    Public,
    Admin,
    Owner,
    Enrolled,
}
