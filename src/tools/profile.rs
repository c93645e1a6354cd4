//! Profile and Session Tools
//!
//! Sign-in/out, onboarding, and profile edits. Onboarding and every
//! anthropometric edit run the energy estimator and overwrite the stored
//! targets as a whole.

use serde::Serialize;

use crate::db::Database;
use crate::models::Profile;
use crate::nutrition::{
    compute_energy_target, ActivityLevel, BodyMetrics, EnergyTarget, Goal,
};

/// In-process session state for the signed-in user.
///
/// Explicitly owned by the server and passed to the handlers that need
/// it; loaded from persistence at startup or sign-in, cleared on
/// sign-out.
#[derive(Debug, Default)]
pub struct Session {
    profile: Option<Profile>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the session from the profile store
    pub fn load(&mut self, db: &Database) -> Result<(), String> {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        self.profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
        Ok(())
    }

    /// Replace the cached profile
    pub fn set(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// Drop the cached profile (sign-out)
    pub fn clear(&mut self) {
        self.profile = None;
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }
}

/// Response for sign_in
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub profile: Profile,
    /// false means the client should run onboarding next
    pub onboarding_complete: bool,
}

/// Response for sign_out
#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub success: bool,
    pub message: String,
}

/// Response wrapping a stored profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub target: Option<EnergyTarget>,
}

/// Fields accepted by update_profile
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
}

impl ProfileEdit {
    fn touches_metrics(&self) -> bool {
        self.age.is_some()
            || self.weight_kg.is_some()
            || self.height_cm.is_some()
            || self.activity_level.is_some()
            || self.goal.is_some()
    }
}

/// Sign in with email and display name, loading any stored profile
pub fn sign_in(
    db: &Database,
    session: &mut Session,
    email: &str,
    name: &str,
) -> Result<SignInResponse, String> {
    if email.trim().is_empty() {
        return Err("Email must not be empty".to_string());
    }
    if name.trim().is_empty() {
        return Err("Name must not be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile =
        Profile::sign_in(&conn, email.trim(), name.trim()).map_err(|e| format!("Sign-in failed: {}", e))?;

    session.set(profile.clone());

    Ok(SignInResponse {
        onboarding_complete: profile.onboarding_complete,
        profile,
    })
}

/// Sign out: clear the session and remove the stored profile
pub fn sign_out(db: &Database, session: &mut Session) -> Result<SignOutResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let removed = Profile::delete(&conn).map_err(|e| format!("Sign-out failed: {}", e))?;

    session.clear();

    Ok(SignOutResponse {
        success: true,
        message: if removed {
            "Signed out; profile removed".to_string()
        } else {
            "Signed out; no stored profile".to_string()
        },
    })
}

/// Get the current profile, refreshing the session from storage
pub fn get_profile(db: &Database, session: &mut Session) -> Result<Option<ProfileResponse>, String> {
    session.load(db)?;

    Ok(session.profile().map(|profile| ProfileResponse {
        target: profile.target,
        profile: profile.clone(),
    }))
}

/// Complete onboarding: validate metrics, compute targets, persist.
///
/// Fails without writing anything if any input is invalid; the caller
/// re-prompts the user.
pub fn complete_onboarding(
    db: &Database,
    session: &mut Session,
    age: u32,
    weight_kg: f64,
    height_cm: f64,
    activity_level: &str,
    goal: &str,
) -> Result<ProfileResponse, String> {
    if !session.is_signed_in() {
        session.load(db)?;
    }
    if !session.is_signed_in() {
        return Err("Not signed in; call sign_in first".to_string());
    }

    let metrics = BodyMetrics {
        age,
        weight_kg,
        height_cm,
        activity_level: ActivityLevel::parse(activity_level).map_err(|e| e.to_string())?,
        goal: Goal::parse(goal).map_err(|e| e.to_string())?,
    };
    let target = compute_energy_target(&metrics).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::save_metrics(&conn, &metrics, &target)
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    session.set(profile.clone());

    Ok(ProfileResponse {
        target: profile.target,
        profile,
    })
}

/// Update the profile. Any change to a metric field recomputes the
/// energy targets from scratch; identity-only edits leave them alone.
pub fn update_profile(
    db: &Database,
    session: &mut Session,
    edit: ProfileEdit,
) -> Result<ProfileResponse, String> {
    session.load(db)?;
    let current = session
        .profile()
        .cloned()
        .ok_or_else(|| "Not signed in; call sign_in first".to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if edit.name.is_some() || edit.email.is_some() {
        Profile::set_identity(&conn, edit.name.as_deref(), edit.email.as_deref())
            .map_err(|e| format!("Failed to update profile: {}", e))?;
    }

    if edit.touches_metrics() {
        // Merge with stored metrics; every field must be present after the
        // merge, otherwise onboarding has not finished yet
        let activity_level = match &edit.activity_level {
            Some(s) => Some(ActivityLevel::parse(s).map_err(|e| e.to_string())?),
            None => current.activity_level,
        };
        let goal = match &edit.goal {
            Some(s) => Some(Goal::parse(s).map_err(|e| e.to_string())?),
            None => current.goal,
        };

        let metrics = BodyMetrics {
            age: edit
                .age
                .or(current.age)
                .ok_or_else(|| "age is required; complete onboarding first".to_string())?,
            weight_kg: edit
                .weight_kg
                .or(current.weight_kg)
                .ok_or_else(|| "weight is required; complete onboarding first".to_string())?,
            height_cm: edit
                .height_cm
                .or(current.height_cm)
                .ok_or_else(|| "height is required; complete onboarding first".to_string())?,
            activity_level: activity_level
                .ok_or_else(|| "activity_level is required; complete onboarding first".to_string())?,
            goal: goal.ok_or_else(|| "goal is required; complete onboarding first".to_string())?,
        };

        let target = compute_energy_target(&metrics).map_err(|e| e.to_string())?;
        Profile::save_metrics(&conn, &metrics, &target)
            .map_err(|e| format!("Failed to save profile: {}", e))?;
    }

    drop(conn);
    session.load(db)?;
    let profile = session
        .profile()
        .cloned()
        .ok_or_else(|| "Profile disappeared during update".to_string())?;

    Ok(ProfileResponse {
        target: profile.target,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| crate::db::migrations::run_migrations(conn))
            .unwrap();
        db
    }

    #[test]
    fn test_onboarding_computes_targets() {
        let db = test_db("profile_onboarding");
        let mut session = Session::new();

        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        let response = complete_onboarding(
            &db,
            &mut session,
            30,
            70.0,
            175.0,
            "sedentary",
            "maintain",
        )
        .unwrap();

        let target = response.target.unwrap();
        assert_eq!(target.daily_calories, 2035);
        assert_eq!(target.daily_protein, 127);
        assert_eq!(target.daily_carbs, 229);
        assert_eq!(target.daily_fat, 68);
        assert!(response.profile.onboarding_complete);
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let db = test_db("profile_invalid");
        let mut session = Session::new();

        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        let err = complete_onboarding(&db, &mut session, 0, 70.0, 175.0, "sedentary", "maintain")
            .unwrap_err();
        assert!(err.contains("age"));

        let profile = get_profile(&db, &mut session).unwrap().unwrap();
        assert!(profile.target.is_none());
        assert!(!profile.profile.onboarding_complete);

        let err =
            complete_onboarding(&db, &mut session, 30, 70.0, 175.0, "couch", "maintain").unwrap_err();
        assert!(err.contains("activity level"));
    }

    #[test]
    fn test_metric_edit_recomputes_targets() {
        let db = test_db("profile_edit");
        let mut session = Session::new();

        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        let before = complete_onboarding(
            &db,
            &mut session,
            30,
            70.0,
            175.0,
            "sedentary",
            "maintain",
        )
        .unwrap();

        let after = update_profile(
            &db,
            &mut session,
            ProfileEdit {
                goal: Some("gain".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            after.target.unwrap().daily_calories,
            before.target.unwrap().daily_calories + 500
        );
    }

    #[test]
    fn test_identity_edit_keeps_targets() {
        let db = test_db("profile_identity");
        let mut session = Session::new();

        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        let before = complete_onboarding(
            &db,
            &mut session,
            30,
            70.0,
            175.0,
            "moderate",
            "lose",
        )
        .unwrap();

        let after = update_profile(
            &db,
            &mut session,
            ProfileEdit {
                name: Some("Ana Maria".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(after.profile.name, "Ana Maria");
        assert_eq!(after.target, before.target);
    }

    #[test]
    fn test_sign_out_clears_session_and_store() {
        let db = test_db("profile_signout");
        let mut session = Session::new();

        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        sign_out(&db, &mut session).unwrap();

        assert!(!session.is_signed_in());
        assert!(get_profile(&db, &mut session).unwrap().is_none());
    }
}
