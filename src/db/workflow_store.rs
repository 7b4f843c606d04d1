// src/db/workflow_store.rs
//
// Implementação Postgres da fronteira de persistência do motor de
// aprovação. Delega para os repositórios; os testes do motor usam a
// versão em memória definida junto do serviço.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        user_repo::NewStaffUser, LodgeRepository, RequestRepository, SetupRepository,
        UserRepository,
    },
    models::{
        auth::User,
        lodge::Lodge,
        request::{StoreRequest, SubmitUserRequestPayload, UserRequest},
        setup::Setup,
    },
    services::approval::WorkflowStore,
};

#[derive(Clone)]
pub struct PgWorkflowStore {
    requests: RequestRepository,
    lodges: LodgeRepository,
    users: UserRepository,
    setup: SetupRepository,
}

impl PgWorkflowStore {
    pub fn new(
        requests: RequestRepository,
        lodges: LodgeRepository,
        users: UserRepository,
        setup: SetupRepository,
    ) -> Self {
        Self {
            requests,
            lodges,
            users,
            setup,
        }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn approve_store_request(&self, id: Uuid) -> Result<Option<StoreRequest>, AppError> {
        self.requests.approve_store_request(id).await
    }

    async fn approve_user_request(&self, id: Uuid) -> Result<Option<UserRequest>, AppError> {
        self.requests.approve_user_request(id).await
    }

    async fn insert_user_request(
        &self,
        payload: &SubmitUserRequestPayload,
    ) -> Result<UserRequest, AppError> {
        self.requests.insert_user_request(payload).await
    }

    async fn get_or_create_lodge(
        &self,
        name: &str,
        city: &str,
        number: Option<&str>,
    ) -> Result<(Lodge, bool), AppError> {
        self.lodges.get_or_create_by_name(name, city, number).await
    }

    async fn find_lodge_by_number(&self, number: &str) -> Result<Option<Lodge>, AppError> {
        self.lodges.find_by_number(number).await
    }

    async fn create_staff_user(&self, new: &NewStaffUser) -> Result<User, AppError> {
        self.users.create_staff_user(new).await
    }

    async fn add_user_to_lodge(&self, user_id: Uuid, lodge_id: Uuid) -> Result<(), AppError> {
        self.lodges.add_member(user_id, lodge_id).await.map(|_| ())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.users.find_by_id(id).await
    }

    async fn setup(&self) -> Result<Option<Setup>, AppError> {
        self.setup.get().await
    }
}
