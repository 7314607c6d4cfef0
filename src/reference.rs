//! The Restro backend SaaS reference document.
//!
//! [`restro_api_story`] assembles the fixed content the `apidoc` binary
//! renders: the tenant model, the collection schemas, the endpoint list and the
//! operational notes of the restaurant backend.

use chrono::NaiveDateTime;

use crate::composer::DocumentComposer;
use crate::config::DEFAULT_TITLE;
use crate::error::ContentError;
use crate::model::{CellRange, TableCommand, TableStyle};
use crate::style::Color;

/// Default location of the rendered reference, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "docs/Restro_SaaS_API_Documentation.pdf";

/// Format of the generation timestamp printed under the title.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA_COLUMN_WIDTHS: [f64; 3] = [45.0, 35.0, 82.0];
const ENDPOINT_COLUMN_WIDTHS: [f64; 3] = [25.0, 75.0, 62.0];

const OVERVIEW: &[&str] = &[
    "One restaurant = one tenant.",
    "Owner registration creates user + tenant + owner membership + trial subscription.",
    "Staff are mapped through role-based memberships.",
    "Authentication uses access and refresh token cookies with rotating refresh sessions.",
];

const TENANT_RESOLUTION: &[&str] = &[
    "x-tenant-slug header",
    "tenantSlug in request body",
    "tenantSlug in query params",
    "subdomain from hostname (abc.myapp.com -> abc)",
];

type Rows = &'static [&'static [&'static str]];

const COLLECTIONS: &[(&str, Rows)] = &[
    (
        "users",
        &[
            &["Field", "Type", "Notes"],
            &["_id", "ObjectId", "Primary key"],
            &["name", "String", "User name"],
            &["email", "String", "Unique, lowercase"],
            &["password", "String", "bcrypt hash, select false"],
            &["isActive", "Boolean", "User status"],
            &["createdAt/updatedAt", "Date", "Timestamps"],
        ],
    ),
    (
        "tenants",
        &[
            &["Field", "Type", "Notes"],
            &["_id", "ObjectId", "Primary key"],
            &["name", "String", "Restaurant name"],
            &["slug", "String", "Unique URL-safe id"],
            &["status", "Enum", "ACTIVE/SUSPENDED"],
            &["ownerUserId", "ObjectId", "Ref users._id"],
            &["createdAt/updatedAt", "Date", "Timestamps"],
        ],
    ),
    (
        "memberships",
        &[
            &["Field", "Type", "Notes"],
            &["userId", "ObjectId", "Ref users._id"],
            &["tenantId", "ObjectId", "Ref tenants._id"],
            &["role", "Enum", "OWNER/MANAGER/KITCHEN/WAITER"],
            &["isActive", "Boolean", "Membership status"],
        ],
    ),
    (
        "subscriptions",
        &[
            &["Field", "Type", "Notes"],
            &["tenantId", "ObjectId", "Unique Ref tenants._id"],
            &["planCode", "String", "TRIAL or paid plan code"],
            &["status", "Enum", "TRIAL/ACTIVE/PAST_DUE/CANCELED/EXPIRED"],
            &["startsAt", "Date", "Subscription start"],
            &["endsAt", "Date", "Subscription end"],
        ],
    ),
    (
        "refreshsessions",
        &[
            &["Field", "Type", "Notes"],
            &["_id", "ObjectId", "Session id used as JWT sid"],
            &["userId", "ObjectId", "Ref users._id"],
            &["tenantId", "ObjectId", "Ref tenants._id"],
            &["role", "String", "Role for session scope"],
            &["tokenHash", "String", "sha256(refresh token)"],
            &["expiresAt", "Date", "TTL indexed"],
            &["revokedAt", "Date", "Null unless revoked"],
        ],
    ),
];

const ENDPOINTS: Rows = &[
    &["Method", "Path", "Access"],
    &["GET", "/api/health", "Public"],
    &["POST", "/api/auth/register-owner", "Public"],
    &["POST", "/api/auth/register", "Public (alias)"],
    &["POST", "/api/auth/login", "Public"],
    &["POST", "/api/auth/refresh", "Public (cookie required)"],
    &["POST", "/api/auth/logout", "Authenticated session cookie"],
    &["GET", "/api/auth/me", "Authenticated"],
    &["GET", "/api/auth/staff-roles", "Public"],
    &["GET", "/api/tenant/staff", "OWNER or MANAGER + active subscription"],
    &["POST", "/api/tenant/staff", "OWNER or MANAGER + active subscription"],
];

const SAMPLE_REQUESTS: &[(&str, &str)] = &[
    (
        "6.1 Register Owner",
        r#"{"name":"Uday","email":"uday@example.com","password":"StrongPass123","restaurantName":"Spicy Hub","restaurantSlug":"spicy-hub"}"#,
    ),
    (
        "6.2 Login",
        r#"{"email":"waiter@example.com","password":"StrongPass123","role":"WAITER","tenantSlug":"spicy-hub"}"#,
    ),
    (
        "6.3 Create Staff",
        r#"{"name":"Ravi","email":"ravi.waiter@example.com","password":"StrongPass123","role":"WAITER"}"#,
    ),
];

const ENVIRONMENT: &[&str] = &[
    "Required: PORT, MONGO_URI (or MONGO_URL), JWT_ACCESS_SECRET, JWT_REFRESH_SECRET",
    "Optional: ACCESS_TOKEN_EXPIRES_IN, REFRESH_TOKEN_EXPIRES_IN, COOKIE_SECURE, COOKIE_DOMAIN",
];

const CHECKLIST: &[&str] = &[
    "Enable HTTPS and set COOKIE_SECURE=true",
    "Store secrets in vault/secret manager",
    "Add rate limiting to auth routes",
    "Add audit logs and invitation workflow",
    "Wire billing webhook to update subscription status",
];

/// Rules shared by the collection schema tables.
pub fn schema_table_style() -> TableStyle {
    TableStyle::new()
        .with(CellRange::header(), TableCommand::Background(Color::LIGHT_GREY))
        .with(CellRange::header(), TableCommand::TextColor(Color::BLACK))
        .with(CellRange::header(), TableCommand::Bold(true))
        .with(CellRange::body(), TableCommand::Bold(false))
        .with(CellRange::all(), TableCommand::FontSize(9))
        .with(CellRange::all(), TableCommand::Grid(Color::GREY))
        .with(CellRange::all(), TableCommand::LeftPadding(4.0))
        .with(CellRange::all(), TableCommand::RightPadding(4.0))
}

/// Rules for the endpoint table. Padding stays at the cell defaults.
pub fn endpoint_table_style() -> TableStyle {
    TableStyle::new()
        .with(CellRange::header(), TableCommand::Background(Color::LIGHT_GREY))
        .with(CellRange::header(), TableCommand::Bold(true))
        .with(CellRange::body(), TableCommand::Bold(false))
        .with(CellRange::all(), TableCommand::FontSize(9))
        .with(CellRange::all(), TableCommand::Grid(Color::GREY))
}

fn push_bullets(composer: &mut DocumentComposer, items: &[&str]) {
    for item in items {
        composer.push(composer.bullet(item));
    }
}

/// Appends the reference document to `composer`, stamped with `generated_at`.
pub fn restro_api_story(
    composer: &mut DocumentComposer,
    generated_at: NaiveDateTime,
) -> Result<(), ContentError> {
    composer.push(composer.heading(DEFAULT_TITLE, 1)?);
    composer.push(composer.paragraph(format!(
        "Generated on: {}",
        generated_at.format(TIMESTAMP_FORMAT)
    )));
    composer.push(composer.spacer(8.0)?);

    composer.push(composer.heading("1. Overview", 2)?);
    composer.push(composer.paragraph(
        "This backend is designed as a multi-tenant restaurant SaaS platform.",
    ));
    push_bullets(composer, OVERVIEW);

    composer.push(composer.heading("2. Roles", 2)?);
    composer.push(composer.paragraph("Supported roles: OWNER, MANAGER, KITCHEN, WAITER"));

    composer.push(composer.heading("3. Tenant Resolution Strategy", 2)?);
    composer.push(composer.paragraph("Restaurant tenant is resolved in this priority order:"));
    push_bullets(composer, TENANT_RESOLUTION);
    composer.push(composer.paragraph(
        "After login, JWT carries tenantId + role, so same URL can still safely separate restaurant data.",
    ));

    composer.push(composer.heading("4. Database Design", 2)?);
    for (collection, rows) in COLLECTIONS {
        composer.push(composer.heading(format!("4.x {}", collection), 3)?);
        composer.push(composer.table(
            rows.iter().map(|row| row.iter().copied()),
            SCHEMA_COLUMN_WIDTHS,
            schema_table_style(),
        )?);
        composer.push(composer.spacer(6.0)?);
    }

    composer.push(composer.heading("5. API Endpoints", 2)?);
    composer.push(composer.table(
        ENDPOINTS.iter().map(|row| row.iter().copied()),
        ENDPOINT_COLUMN_WIDTHS,
        endpoint_table_style(),
    )?);
    composer.push(composer.spacer(8.0)?);

    composer.push(composer.heading("6. Sample Requests", 2)?);
    for (title, body) in SAMPLE_REQUESTS {
        composer.push(composer.heading(*title, 3)?);
        composer.push(composer.paragraph(*body));
    }

    composer.push(composer.heading("7. Environment Variables", 2)?);
    push_bullets(composer, ENVIRONMENT);

    composer.push(composer.heading("8. Production Checklist", 2)?);
    push_bullets(composer, CHECKLIST);

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{restro_api_story, COLLECTIONS};
    use crate::composer::DocumentComposer;
    use crate::config::PageConfig;
    use crate::model::{ContentBlock, HeadingLevel, Story};

    fn story() -> Story {
        let generated_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp");
        let mut composer = DocumentComposer::new(PageConfig::default());
        restro_api_story(&mut composer, generated_at).expect("reference content is valid");
        composer.story().clone()
    }

    #[test]
    fn appends_after_blocks_already_in_the_session() {
        let generated_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .expect("valid timestamp");
        let mut composer = DocumentComposer::new(PageConfig::default());
        composer.push(composer.paragraph("cover note"));
        restro_api_story(&mut composer, generated_at).expect("reference content is valid");

        let blocks = composer.story().blocks();
        assert_eq!(blocks.len(), story().len() + 1);
        assert_eq!(
            blocks[0].text_block().map(|content| content.text()),
            Some("cover note")
        );
    }

    #[test]
    fn starts_with_title_and_timestamp() {
        let story = story();
        let blocks = story.blocks();
        assert!(matches!(
            &blocks[0],
            ContentBlock::Heading { level: HeadingLevel::H1, content }
                if content.text() == "Restro Backend SaaS Documentation"
        ));
        assert_eq!(
            blocks[1].text_block().map(|content| content.text()),
            Some("Generated on: 2024-05-01 09:30:00")
        );
    }

    #[test]
    fn has_one_table_per_collection_plus_endpoints() {
        let story = story();
        let tables: Vec<usize> = story
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Table(table) => Some(table.row_count()),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), COLLECTIONS.len() + 1);
        assert_eq!(tables[0], 7);
        assert_eq!(tables.last().copied(), Some(11));
    }

    #[test]
    fn section_headings_appear_in_order() {
        let story = story();
        let sections: Vec<&str> = story
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Heading {
                    level: HeadingLevel::H2,
                    content,
                } => Some(content.text()),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            [
                "1. Overview",
                "2. Roles",
                "3. Tenant Resolution Strategy",
                "4. Database Design",
                "5. API Endpoints",
                "6. Sample Requests",
                "7. Environment Variables",
                "8. Production Checklist",
            ]
        );
    }
}
