use client_state::TimeSource;
use client_state::cache::RequestCache;
use payloads::requests::{NewUser, UpdateUser};
use payloads::responses::CreatedUser;
use payloads::{APIClient, ClientError, User, UserId};
use std::rc::Rc;

use crate::get_api_client;

/// User directory calls with a short-lived read cache, so the table and a
/// dialog opened from it don't both hit the API in the same instant.
/// Writes drop everything cached under `users`.
pub struct UsersService {
    client: APIClient,
    list: RequestCache<Vec<User>>,
    by_id: RequestCache<User>,
}

thread_local! {
    static SERVICE: Rc<UsersService> = Rc::new(UsersService::new(get_api_client()));
}

pub fn users_service() -> Rc<UsersService> {
    SERVICE.with(Rc::clone)
}

impl UsersService {
    pub fn new(client: APIClient) -> Self {
        Self {
            client,
            list: RequestCache::new(TimeSource::new()),
            by_id: RequestCache::new(TimeSource::new()),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        self.list
            .get_or_fetch("users", || self.client.list_users())
            .await
    }

    pub async fn get(&self, user_id: UserId) -> Result<User, ClientError> {
        self.by_id
            .get_or_fetch(&format!("users/{user_id}"), || {
                self.client.get_user(user_id)
            })
            .await
    }

    pub async fn create(
        &self,
        details: &NewUser,
    ) -> Result<CreatedUser, ClientError> {
        let result = self.client.create_user(details).await;
        self.invalidate();
        result
    }

    pub async fn update(
        &self,
        user_id: UserId,
        patch: &UpdateUser,
    ) -> Result<User, ClientError> {
        let result = self.client.update_user(user_id, patch).await;
        self.invalidate();
        result
    }

    pub async fn delete(&self, user_id: UserId) -> Result<(), ClientError> {
        let result = self.client.delete_user(user_id).await;
        self.invalidate();
        result
    }

    fn invalidate(&self) {
        self.list.invalidate_prefix("users");
        self.by_id.invalidate_prefix("users");
    }
}
