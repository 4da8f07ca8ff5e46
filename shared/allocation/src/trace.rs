use crate::UserId;
use pileus_core::deterministic_rng;
use rand::Rng;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("operation {position} names user {user}, but only {total_users} users exist")]
    UserOutOfRange {
        position: usize,
        user: UserId,
        total_users: usize,
    },
}

/// Ordered user ids, one per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    users: Vec<UserId>,
    total_users: usize,
}

impl Trace {
    pub fn new(users: Vec<UserId>, total_users: usize) -> Result<Self, TraceError> {
        if let Some((position, &user)) = users
            .iter()
            .enumerate()
            .find(|(_, user)| **user >= total_users)
        {
            return Err(TraceError::UserOutOfRange {
                position,
                user,
                total_users,
            });
        }
        Ok(Trace { users, total_users })
    }

    /// `len` operations by users drawn uniformly from `0..total_users`.
    pub fn generate(len: usize, total_users: usize, seed: u64) -> Self {
        assert!(total_users > 0, "cannot draw from zero users");
        let mut rng = deterministic_rng(seed);
        let users = (0..len).map(|_| rng.gen_range(0..total_users)).collect();
        Trace { users, total_users }
    }

    /// Parses the two column `round user` text form.
    ///
    /// Blank lines and `#` comments are skipped, as is a leading
    /// `round user` header. Rows are replayed in file order. The user
    /// population is taken to be `max id + 1`.
    pub fn parse(text: &str) -> Result<Self, TraceError> {
        let mut users = Vec::new();
        let mut seen_row = false;
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let fields: Vec<&str> = content.split_whitespace().collect();
            if !seen_row && fields.first() == Some(&"round") {
                seen_row = true;
                continue;
            }
            seen_row = true;
            let [_, user] = fields.as_slice() else {
                return Err(TraceError::Parse {
                    line,
                    reason: format!("expected 2 columns, found {}", fields.len()),
                });
            };
            let user = user.parse::<UserId>().map_err(|e| TraceError::Parse {
                line,
                reason: format!("bad user id {user:?}: {e}"),
            })?;
            users.push(user);
        }
        let total_users = users.iter().max().map(|max| max + 1).unwrap_or(0);
        Ok(Trace { users, total_users })
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn total_users(&self) -> usize {
        self.total_users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Widens the user population, e.g. to match a configured user count.
    pub fn with_total_users(self, total_users: usize) -> Result<Self, TraceError> {
        Trace::new(self.users, total_users.max(self.total_users))
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "round\tuser")?;
        for (round, user) in self.users.iter().enumerate() {
            writeln!(f, "{}\t{}", round + 1, user)?;
        }
        Ok(())
    }
}
