use crate::error::AgendaError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::dtos::AppointmentDTO;
use agenda_api_structs::get_user_appointments::*;
use agenda_domain::{Appointment, ID};
use agenda_infra::AgendaContext;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

pub async fn get_user_appointments_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let usecase = GetUserAppointmentsUseCase {
        user_id: path_params.user_id.clone(),
        page: query_params.page.unwrap_or(DEFAULT_PAGE),
        limit: query_params.limit.unwrap_or(DEFAULT_LIMIT),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                appointments: res
                    .appointments
                    .into_iter()
                    .map(AppointmentDTO::new)
                    .collect(),
                total: res.total,
                page: res.page,
                limit: res.limit,
                total_pages: res.total_pages,
            })
        })
        .map_err(AgendaError::from)
}

#[derive(Debug)]
pub struct GetUserAppointmentsUseCase {
    pub user_id: ID,
    /// Starts at 1
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, PartialEq)]
pub struct UseCaseResponse {
    pub appointments: Vec<Appointment>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidPage,
    InvalidLimit,
    StorageError,
}

impl From<UseCaseError> for AgendaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidPage => Self::BadClientData("page is out of range".into()),
            UseCaseError::InvalidLimit => Self::BadClientData(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUserAppointmentsUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "GetUserAppointments";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        if self.page < 1 {
            return Err(UseCaseError::InvalidPage);
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(UseCaseError::InvalidLimit);
        }

        let skip = (self.page - 1)
            .checked_mul(self.limit)
            .ok_or(UseCaseError::InvalidPage)?;
        let page = ctx
            .repos
            .appointments
            .find_by_user(&self.user_id, skip, self.limit)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UseCaseResponse {
            appointments: page.items,
            total: page.total,
            page: self.page,
            limit: self.limit,
            total_pages: (page.total + self.limit - 1) / self.limit,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    async fn insert_for_user(ctx: &AgendaContext, user_id: &ID, count: i64) {
        for i in 0..count {
            let appointment = Appointment {
                id: Default::default(),
                user_id: user_id.clone(),
                title: format!("Session {}", i),
                start_ts: 1000 * (i + 1),
                end_ts: 1000 * (i + 1) + 500,
                observation: None,
                created: 0,
                updated: 0,
            };
            ctx.repos.appointments.insert(&appointment).await.unwrap();
        }
    }

    #[actix_web::test]
    async fn paginates_appointments_of_user() {
        let ctx = AgendaContext::create_inmemory();
        let user_id = ID::default();
        insert_for_user(&ctx, &user_id, 12).await;
        insert_for_user(&ctx, &ID::default(), 3).await;

        let mut usecase = GetUserAppointmentsUseCase {
            user_id: user_id.clone(),
            page: 2,
            limit: 5,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.total, 12);
        assert_eq!(res.total_pages, 3);
        assert_eq!(res.page, 2);
        assert_eq!(res.limit, 5);
        assert_eq!(res.appointments.len(), 5);
        assert!(res.appointments.iter().all(|a| a.user_id == user_id));

        let mut usecase = GetUserAppointmentsUseCase {
            user_id,
            page: 3,
            limit: 5,
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().appointments.len(), 2);
    }

    #[actix_web::test]
    async fn user_without_appointments_has_no_pages() {
        let ctx = AgendaContext::create_inmemory();
        let mut usecase = GetUserAppointmentsUseCase {
            user_id: ID::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.total, 0);
        assert_eq!(res.total_pages, 0);
        assert!(res.appointments.is_empty());
    }

    #[actix_web::test]
    async fn rejects_invalid_pagination() {
        let ctx = AgendaContext::create_inmemory();
        for (page, limit, expected) in vec![
            (0, 10, UseCaseError::InvalidPage),
            (1, 0, UseCaseError::InvalidLimit),
            (1, MAX_LIMIT + 1, UseCaseError::InvalidLimit),
        ] {
            let mut usecase = GetUserAppointmentsUseCase {
                user_id: ID::default(),
                page,
                limit,
            };
            assert_eq!(usecase.execute(&ctx).await, Err(expected));
        }
    }

    #[actix_web::test]
    async fn rejects_page_too_far_out() {
        let ctx = AgendaContext::create_inmemory();
        insert_for_user(&ctx, &ID::default(), 1).await;

        let mut usecase = GetUserAppointmentsUseCase {
            user_id: ID::default(),
            page: i64::MAX,
            limit: MAX_LIMIT,
        };
        assert_eq!(usecase.execute(&ctx).await, Err(UseCaseError::InvalidPage));

        // Far but representable pages are just empty
        let mut usecase = GetUserAppointmentsUseCase {
            user_id: ID::default(),
            page: i64::MAX / MAX_LIMIT,
            limit: MAX_LIMIT,
        };
        assert!(usecase.execute(&ctx).await.unwrap().appointments.is_empty());
    }
}
