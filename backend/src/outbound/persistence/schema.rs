//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Login identities. One row per student, staff member, or admin.
    accounts (id) {
        id -> Int8,
        /// Unique, at most 20 characters.
        username -> Varchar,
        /// `pbkdf2_sha256$rounds$salt$digest`.
        password_hash -> Text,
        /// `student`, `staff`, or `admin`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student profile and cached running total of approved hours.
    student_profiles (id) {
        id -> Int8,
        account_id -> Int8,
        total_hours -> Float8,
    }
}

diesel::table! {
    staff_profiles (id) {
        id -> Int8,
        account_id -> Int8,
    }
}

diesel::table! {
    /// Hour submissions awaiting or past staff review.
    confirmation_requests (id) {
        id -> Int8,
        student_id -> Int8,
        /// Reviewer; null while pending.
        staff_id -> Nullable<Int8>,
        hours -> Float8,
        description -> Varchar,
        /// `pending`, `approved`, or `rejected`.
        status -> Varchar,
        requested_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
        reason -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Append-only record of approved service. A trigger refuses updates
    /// and deletes.
    service_log_entries (id) {
        id -> Int8,
        request_id -> Int8,
        student_id -> Int8,
        staff_id -> Int8,
        hours -> Float8,
        description -> Varchar,
        logged_at -> Timestamptz,
    }
}

diesel::table! {
    /// Milestones held by a student. Unique on `(student_id, accolade_type)`.
    accolades (id) {
        id -> Int8,
        student_id -> Int8,
        /// `10`, `25`, or `50`.
        accolade_type -> Varchar,
        awarded_at -> Timestamptz,
    }
}

diesel::joinable!(student_profiles -> accounts (account_id));
diesel::joinable!(staff_profiles -> accounts (account_id));
diesel::joinable!(confirmation_requests -> student_profiles (student_id));
diesel::joinable!(service_log_entries -> confirmation_requests (request_id));
diesel::joinable!(accolades -> student_profiles (student_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    student_profiles,
    staff_profiles,
    confirmation_requests,
    service_log_entries,
    accolades,
);
