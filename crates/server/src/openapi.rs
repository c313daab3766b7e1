use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ClientInputDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// YYYY-MM-DD
    pub date_of_birth: Option<String>,
}

#[derive(ToSchema)]
pub struct ClientUpdateDoc {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(ToSchema)]
pub struct ServiceInputDoc {
    pub title: String,
    /// Derived from the title when omitted
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Decimal with at most two places, e.g. "45.00"
    pub price: String,
    pub duration_minutes: Option<i32>,
    pub image_ref: Option<String>,
}

#[derive(ToSchema)]
pub struct ServiceUpdateDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub duration_minutes: Option<i32>,
    pub image_ref: Option<String>,
}

#[derive(ToSchema)]
pub struct BookingRequestDoc {
    /// Defaults to the caller
    pub client_id: Option<Uuid>,
    pub service_id: Uuid,
    /// RFC 3339 or YYYY-MM-DDTHH:MM (UTC)
    pub requested_at: String,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct PaymentInputDoc {
    pub amount: String,
    /// reservation | installment (default installment); final payments come from complete-payment
    pub kind: Option<String>,
}

#[derive(ToSchema)]
pub struct ContactInquiryDoc {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::clients::list,
        crate::routes::clients::create,
        crate::routes::clients::get,
        crate::routes::clients::update,
        crate::routes::catalog::list,
        crate::routes::catalog::popular,
        crate::routes::catalog::get,
        crate::routes::catalog::get_by_slug,
        crate::routes::catalog::create,
        crate::routes::catalog::update,
        crate::routes::catalog::delete,
        crate::routes::appointments::list,
        crate::routes::appointments::create,
        crate::routes::appointments::get,
        crate::routes::appointments::soft_delete,
        crate::routes::appointments::confirm,
        crate::routes::appointments::cancel,
        crate::routes::appointments::complete_payment,
        crate::routes::payments::ledger,
        crate::routes::payments::record,
        crate::routes::payments::balance,
        crate::routes::reminders::list,
        crate::routes::reminders::mark_sent,
        crate::routes::reminders::dispatch,
        crate::routes::contact::submit,
    ),
    components(
        schemas(
            HealthResponse,
            ClientInputDoc,
            ClientUpdateDoc,
            ServiceInputDoc,
            ServiceUpdateDoc,
            BookingRequestDoc,
            PaymentInputDoc,
            ContactInquiryDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "clients"),
        (name = "catalog"),
        (name = "appointments"),
        (name = "payments"),
        (name = "reminders"),
        (name = "contact")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/appointments"));
        assert!(paths.contains_key("/api/appointments/{id}/complete-payment"));
        assert!(paths.contains_key("/contact"));
    }
}
