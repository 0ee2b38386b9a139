//! Authentication: customer login and the parallel admin identity path.
//!
//! Unknown login name and wrong password return the *same* error so the
//! response never reveals which field was wrong. Account disablement is
//! an administrative state, not a secrecy boundary — it reports itself
//! distinctly, and is checked before the password.

use crate::credentials;
use crate::customer_admin;
use crate::error::{ServiceError, ServiceResult};
use crate::geo::GeoResolver;
use crate::login_tracker::{ClientAddr, LoginTracker};
use crate::session::{SessionCredential, SessionIssuer};
use crate::store::Store;
use crate::types::AdminId;
use crate::views::{AdminView, CustomerDetail};
use chrono::Utc;
use serde::Deserialize;

/// A successful customer login: the refreshed detail view (hash
/// stripped), the session credential, and a warning when enrichment
/// could not be recorded.
#[derive(Debug)]
pub struct LoginSuccess {
    pub customer: CustomerDetail,
    pub session: SessionCredential,
    pub enrichment_warning: Option<String>,
}

/// A successful admin login.
#[derive(Debug)]
pub struct AdminSession {
    pub admin: AdminView,
    pub session: SessionCredential,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmin {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub referral: Option<String>,
}

pub struct AuthService<'a> {
    store: &'a Store,
    issuer: &'a SessionIssuer,
    geo: &'a dyn GeoResolver,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a Store, issuer: &'a SessionIssuer, geo: &'a dyn GeoResolver) -> Self {
        Self { store, issuer, geo }
    }

    // ── Customer login ────────────────────────────────────────────────

    pub fn authenticate(
        &self,
        login_user_name: &str,
        login_password: &str,
        client: &ClientAddr,
    ) -> ServiceResult<LoginSuccess> {
        if login_user_name.is_empty() || login_password.is_empty() {
            return Err(ServiceError::Validation(
                "loginUserName and loginPassword are required".to_string(),
            ));
        }

        let customer = self
            .store
            .customer_by_login_name(login_user_name)?
            .ok_or(ServiceError::InvalidCredentials)?;

        if customer.login_is_disabled {
            return Err(ServiceError::AccountDisabled);
        }

        if !credentials::verify_password(login_password, &customer.login_password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.issuer.issue(&customer.login_user_name);

        // Enrichment runs before the response is finalized, but its
        // failure never fails an authenticated login.
        let tracker = LoginTracker::new(self.store, self.geo);
        let enrichment_warning = match tracker.record_login(customer.id, client) {
            Ok(_) => None,
            Err(e) => {
                log::warn!("login enrichment failed for customer {}: {e}", customer.id);
                Some("login provenance could not be recorded".to_string())
            }
        };

        // Re-read so the response carries the enriched provenance.
        let refreshed = self
            .store
            .customer_by_id(customer.id)?
            .ok_or(ServiceError::NotFound("Customer"))?;
        let detail = customer_admin::detail_view(self.store, &refreshed)?;

        log::info!(
            "customer {} authenticated from {}",
            refreshed.id,
            detail.login_ip.as_deref().unwrap_or("unknown")
        );

        Ok(LoginSuccess {
            customer: detail,
            session,
            enrichment_warning,
        })
    }

    // ── Admin identity path ───────────────────────────────────────────
    //
    // Same contract shape (name + password → session) against a
    // separate, smaller record set. No provenance tracking.

    pub fn register_admin(&self, body: &NewAdmin) -> ServiceResult<AdminView> {
        if body.user_name.is_empty() || body.phone_number.is_empty() || body.password.is_empty() {
            return Err(ServiceError::Validation(
                "Username, phone, and password are required".to_string(),
            ));
        }

        if self.store.admin_by_user_name(&body.user_name)?.is_some() {
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }

        let hash = credentials::hash_password(&body.password)?;
        let admin_no = self.store.next_admin_no()?;
        let id = self.store.insert_admin(
            admin_no,
            &body.user_name,
            &body.phone_number,
            &hash,
            body.referral.as_deref(),
            Utc::now(),
        )?;

        let admin = self
            .store
            .admin_by_id(id)?
            .ok_or(ServiceError::NotFound("Admin"))?;
        log::info!("admin {} registered (no. {admin_no})", admin.user_name);
        Ok(AdminView::from(&admin))
    }

    pub fn login_admin(&self, name: &str, password: &str) -> ServiceResult<AdminSession> {
        if name.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "userName and password are required".to_string(),
            ));
        }

        let admin = self
            .store
            .admin_by_user_name(name)?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !credentials::verify_password(password, &admin.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.issuer.issue(&admin.user_name);
        Ok(AdminSession {
            admin: AdminView::from(&admin),
            session,
        })
    }

    pub fn admin_by_id(&self, id: AdminId) -> ServiceResult<AdminView> {
        let admin = self
            .store
            .admin_by_id(id)?
            .ok_or(ServiceError::NotFound("Admin"))?;
        Ok(AdminView::from(&admin))
    }

    pub fn list_admins(&self, limit: i64) -> ServiceResult<Vec<AdminView>> {
        let admins = self.store.list_admins(limit)?;
        Ok(admins.iter().map(AdminView::from).collect())
    }
}
