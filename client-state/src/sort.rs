use jiff::Timestamp;
use payloads::User;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rows per page in the users table.
pub const USERS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortField {
    UserName,
    FirstName,
    LastName,
    Email,
    Roles,
    Status,
    CreatedAt,
    LastLogin,
}

impl UserSortField {
    pub const ALL: [UserSortField; 8] = [
        Self::UserName,
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Roles,
        Self::Status,
        Self::CreatedAt,
        Self::LastLogin,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UserName => "Username",
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::Roles => "Roles",
            Self::Status => "Status",
            Self::CreatedAt => "Created",
            Self::LastLogin => "Last Login",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSettings {
    pub field: UserSortField,
    pub direction: SortDirection,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            field: UserSortField::UserName,
            direction: SortDirection::Asc,
        }
    }
}

impl SortSettings {
    /// Clicking the active column flips direction; a new column starts
    /// ascending.
    pub fn toggled(self, field: UserSortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Time(Timestamp),
}

fn text(value: &str) -> Option<SortKey> {
    let value = value.trim();
    (!value.is_empty()).then(|| SortKey::Text(value.to_lowercase()))
}

fn sort_key(user: &User, field: UserSortField) -> Option<SortKey> {
    match field {
        UserSortField::UserName => text(&user.user_name),
        UserSortField::FirstName => text(&user.first_name),
        UserSortField::LastName => text(&user.last_name),
        UserSortField::Email => text(&user.email),
        UserSortField::Roles => {
            let roles: Vec<String> =
                user.roles.iter().map(|role| role.to_string()).collect();
            text(&roles.join(","))
        }
        UserSortField::Status => text(user.status.as_str()),
        UserSortField::CreatedAt => user.created_at.map(SortKey::Time),
        UserSortField::LastLogin => user.last_login.map(SortKey::Time),
    }
}

/// Stable sort. Text compares case-insensitively; missing values come first
/// ascending and last descending.
pub fn sort_users(users: &[User], sort: SortSettings) -> Vec<User> {
    let mut keyed: Vec<(Option<SortKey>, &User)> = users
        .iter()
        .map(|user| (sort_key(user, sort.field), user))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        // Option orders None before Some
        let ordering: Ordering = a.cmp(b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    keyed.into_iter().map(|(_, user)| user.clone()).collect()
}

/// Number of pages needed to show `total` rows; never zero.
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// Rows on a 1-based page. Pages past the end clamp to the last page.
pub fn page<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let page = page.clamp(1, page_count(items.len(), per_page));
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    &items[start.min(end)..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use payloads::{Role, UserId, UserStatus};

    fn user(id: i64, user_name: &str, last_login: Option<&str>) -> User {
        User {
            id: UserId(id),
            user_name: user_name.into(),
            first_name: "Test".into(),
            last_name: String::new(),
            email: format!("{user_name}@example.com"),
            roles: vec![Role::User],
            status: UserStatus::Active,
            created_at: None,
            last_login: last_login.map(|t| t.parse().unwrap()),
        }
    }

    fn ids(users: &[User]) -> Vec<i64> {
        users.iter().map(|u| u.id.0).collect()
    }

    #[test]
    fn sorts_text_case_insensitively() {
        let users = [user(1, "bravo", None), user(2, "Alpha", None), user(3, "charlie", None)];
        let sorted = sort_users(&users, SortSettings::default());
        assert_eq!(ids(&sorted), vec![2, 1, 3]);

        let desc = SortSettings {
            field: UserSortField::UserName,
            direction: SortDirection::Desc,
        };
        assert_eq!(ids(&sort_users(&users, desc)), vec![3, 1, 2]);
    }

    #[test]
    fn missing_values_first_ascending_last_descending() {
        let users = [
            user(1, "a", Some("2025-01-02T00:00:00Z")),
            user(2, "b", None),
            user(3, "c", Some("2025-01-01T00:00:00Z")),
        ];
        let asc = SortSettings {
            field: UserSortField::LastLogin,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_users(&users, asc)), vec![2, 3, 1]);
        assert_eq!(ids(&sort_users(&users, asc.toggled(UserSortField::LastLogin))), vec![1, 3, 2]);
    }

    #[test]
    fn equal_keys_keep_input_order_in_both_directions() {
        // every last_name is empty, so all keys tie
        let users = [user(4, "d", None), user(1, "a", None), user(3, "c", None)];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sort = SortSettings {
                field: UserSortField::LastName,
                direction,
            };
            assert_eq!(ids(&sort_users(&users, sort)), vec![4, 1, 3]);
        }
    }

    #[test]
    fn toggling_flips_or_restarts() {
        let sort = SortSettings::default();
        let flipped = sort.toggled(UserSortField::UserName);
        assert_eq!(flipped.direction, SortDirection::Desc);

        let email = flipped.toggled(UserSortField::Email);
        assert_eq!(email.field, UserSortField::Email);
        assert_eq!(email.direction, SortDirection::Asc);
    }

    #[test]
    fn pages_clamp_to_range() {
        let rows: Vec<usize> = (0..23).collect();
        assert_eq!(page_count(rows.len(), USERS_PER_PAGE), 3);
        assert_eq!(page(&rows, 3, USERS_PER_PAGE), &[20, 21, 22]);
        assert_eq!(page(&rows, 9, USERS_PER_PAGE), &[20, 21, 22]);
        assert_eq!(page(&rows, 0, USERS_PER_PAGE).len(), 10);

        let empty: [usize; 0] = [];
        assert_eq!(page_count(0, USERS_PER_PAGE), 1);
        assert!(page(&empty, 1, USERS_PER_PAGE).is_empty());
    }
}
