use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{Pagination, WishPayload};
use super::repo::WishRepo;
use super::repo_types::{Page, Wish, WishFields};
use crate::{
    error::{ApiError, FieldErrors},
    validation::{max_chars, optional_text, required_input, Input, INVALID_NUMBER},
};

pub const TITLE_MAX_LEN: usize = 127;
pub const LINK_MAX_LEN: usize = 127;
pub const DEFAULT_PRICE: f64 = 0.0;

const NEGATIVE_PRICE: &str = "Ensure this value is greater than or equal to 0.";
const NEGATIVE_PAGE: &str = "Ensure this value is greater than or equal to 0.";

/// How a payload is applied: create and PUT need a title, PATCH needs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Replace,
    Patch,
}

/// Merges the payload over `base` (the stored wish, if any) and validates the result.
/// Fields the payload omits keep their stored value, or the default on create.
pub fn validate(
    payload: WishPayload,
    base: Option<&Wish>,
    mode: WriteMode,
) -> Result<WishFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = match (payload.title, base) {
        (Input::Missing, Some(b)) if mode == WriteMode::Patch => Ok(b.title.clone()),
        (title, _) => required_input(title).and_then(|t| max_chars(t, TITLE_MAX_LEN)),
    };

    let price = match payload.price.into_result() {
        Ok(Some(p)) if !p.is_finite() => Err(INVALID_NUMBER.to_string()),
        Ok(Some(p)) if p < 0.0 => Err(NEGATIVE_PRICE.to_string()),
        // folds -0.0 into 0.0
        Ok(Some(p)) => Ok(p + 0.0),
        Ok(None) => Ok(base.map_or(DEFAULT_PRICE, |b| b.price)),
        Err(msg) => Err(msg),
    };

    let link = match payload.link.into_result() {
        Ok(Some(link)) => max_chars(optional_text(link), LINK_MAX_LEN),
        Ok(None) => Ok(base.map(|b| b.link.clone()).unwrap_or_default()),
        Err(msg) => Err(msg),
    };

    let description = match payload.description.into_result() {
        Ok(Some(d)) => Ok(optional_text(d)),
        Ok(None) => Ok(base.map(|b| b.description.clone()).unwrap_or_default()),
        Err(msg) => Err(msg),
    };

    let title = errors.collect("title", title);
    let price = errors.collect("price", price);
    let link = errors.collect("link", link);
    let description = errors.collect("description", description);

    match (title, price, link, description) {
        (Some(title), Some(price), Some(link), Some(description)) => Ok(WishFields {
            title,
            price,
            link,
            description,
        }),
        _ => Err(errors),
    }
}

fn page_from(p: Pagination) -> Result<Page, FieldErrors> {
    let mut errors = FieldErrors::new();
    if p.limit.is_some_and(|l| l < 0) {
        errors.add("limit", NEGATIVE_PAGE);
    }
    if p.offset.is_some_and(|o| o < 0) {
        errors.add("offset", NEGATIVE_PAGE);
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Page {
        limit: p.limit,
        offset: p.offset.unwrap_or(0),
    })
}

pub async fn list_wishes(
    repo: &dyn WishRepo,
    owner_id: Uuid,
    pagination: Pagination,
) -> Result<Vec<Wish>, ApiError> {
    let page = page_from(pagination)?;
    Ok(repo.list_by_owner(owner_id, page).await?)
}

pub async fn get_wish(repo: &dyn WishRepo, owner_id: Uuid, id: Uuid) -> Result<Wish, ApiError> {
    repo.get(owner_id, id).await?.ok_or(ApiError::NotFound)
}

pub async fn create_wish(
    repo: &dyn WishRepo,
    owner_id: Uuid,
    payload: WishPayload,
) -> Result<Wish, ApiError> {
    let fields = validate(payload, None, WriteMode::Create).map_err(|errors| {
        warn!(%owner_id, errors = ?errors, "wish rejected");
        errors
    })?;
    let wish = repo.create(owner_id, fields).await?;
    info!(%owner_id, wish_id = %wish.id, "wish created");
    Ok(wish)
}

/// PUT when `partial` is false, PATCH otherwise. Ownership is resolved
/// before the payload is looked at.
pub async fn update_wish(
    repo: &dyn WishRepo,
    owner_id: Uuid,
    id: Uuid,
    payload: WishPayload,
    partial: bool,
) -> Result<Wish, ApiError> {
    let current = get_wish(repo, owner_id, id).await?;
    let mode = if partial { WriteMode::Patch } else { WriteMode::Replace };
    let fields = validate(payload, Some(&current), mode).map_err(|errors| {
        warn!(%owner_id, wish_id = %id, errors = ?errors, "wish update rejected");
        errors
    })?;
    let wish = repo
        .update(owner_id, id, fields)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(%owner_id, wish_id = %id, "wish updated");
    Ok(wish)
}

pub async fn delete_wish(repo: &dyn WishRepo, owner_id: Uuid, id: Uuid) -> Result<(), ApiError> {
    if !repo.delete(owner_id, id).await? {
        return Err(ApiError::NotFound);
    }
    info!(%owner_id, wish_id = %id, "wish deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wishes::memory::MemoryWishRepo;

    fn payload(title: Option<&str>) -> WishPayload {
        WishPayload {
            title: title.map_or(Input::Missing, |t| Input::Value(t.into())),
            ..WishPayload::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let fields = validate(payload(Some("Test Wish")), None, WriteMode::Create).unwrap();
        assert_eq!(fields.price, 0.0);
        assert_eq!(fields.link, "");
        assert_eq!(fields.description, "");
    }

    #[test]
    fn create_requires_title() {
        let errors = validate(WishPayload::default(), None, WriteMode::Create).unwrap_err();
        assert_eq!(errors.get("title").unwrap(), ["This field is required."]);

        let errors = validate(payload(Some("   ")), None, WriteMode::Create).unwrap_err();
        assert_eq!(errors.get("title").unwrap(), ["This field may not be blank."]);
    }

    #[test]
    fn length_limits() {
        let errors = validate(payload(Some(&"Test Wish".repeat(100))), None, WriteMode::Create)
            .unwrap_err();
        assert_eq!(errors.get("title").unwrap().len(), 1);

        let errors = validate(
            WishPayload {
                title: Input::Value("Test Wish".into()),
                link: Input::Value("link".repeat(100)),
                ..WishPayload::default()
            },
            None,
            WriteMode::Create,
        )
        .unwrap_err();
        assert_eq!(errors.get("link").unwrap().len(), 1);
        assert!(!errors.has("title"));

        let exact = validate(payload(Some(&"t".repeat(127))), None, WriteMode::Create);
        assert!(exact.is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let errors = validate(
            WishPayload {
                title: Input::Value("Test Wish".into()),
                price: Input::Value(-100.0),
                ..WishPayload::default()
            },
            None,
            WriteMode::Create,
        )
        .unwrap_err();
        assert_eq!(errors.get("price").unwrap(), [NEGATIVE_PRICE]);
    }

    #[test]
    fn price_type_errors_are_reported_on_price() {
        for price in [Input::Invalid, Input::Null, Input::Value(f64::INFINITY)] {
            let errors = validate(
                WishPayload {
                    title: Input::Value("Test Wish".into()),
                    price,
                    ..WishPayload::default()
                },
                None,
                WriteMode::Create,
            )
            .unwrap_err();
            assert_eq!(errors.get("price").unwrap().len(), 1);
            assert!(!errors.has("title"));
        }
    }

    #[test]
    fn negative_zero_price_is_stored_as_zero() {
        let fields = validate(
            WishPayload {
                title: Input::Value("Test Wish".into()),
                price: Input::Value(-0.0),
                ..WishPayload::default()
            },
            None,
            WriteMode::Create,
        )
        .unwrap();
        assert!(fields.price.is_sign_positive());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = validate(
            WishPayload {
                title: Input::Invalid,
                price: Input::Value(-1.0),
                link: Input::Null,
                description: Input::Invalid,
            },
            None,
            WriteMode::Create,
        )
        .unwrap_err();
        for field in ["title", "price", "link", "description"] {
            assert_eq!(errors.get(field).unwrap().len(), 1, "{field}");
        }
    }

    #[tokio::test]
    async fn patch_keeps_omitted_fields_and_put_requires_title() {
        let repo = MemoryWishRepo::new();
        let owner = Uuid::new_v4();
        let wish = create_wish(
            &repo,
            owner,
            WishPayload {
                title: Input::Value("Bike".into()),
                price: Input::Value(250.0),
                link: Input::Value("https://example.com/bike".into()),
                description: Input::Value("red".into()),
            },
        )
        .await
        .unwrap();

        let patched = update_wish(
            &repo,
            owner,
            wish.id,
            WishPayload {
                price: Input::Value(199.5),
                ..WishPayload::default()
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(patched.title, "Bike");
        assert_eq!(patched.price, 199.5);
        assert_eq!(patched.description, "red");

        let err = update_wish(&repo, owner, wish.id, WishPayload::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e.has("title")));

        let replaced = update_wish(&repo, owner, wish.id, payload(Some("Scooter")), false)
            .await
            .unwrap();
        assert_eq!(replaced.title, "Scooter");
        assert_eq!(replaced.link, "https://example.com/bike");
    }

    #[tokio::test]
    async fn foreign_wishes_look_missing() {
        let repo = MemoryWishRepo::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let wish = create_wish(&repo, alice, payload(Some("Bike"))).await.unwrap();

        assert!(matches!(
            get_wish(&repo, bob, wish.id).await,
            Err(ApiError::NotFound)
        ));
        // ownership is checked before validation, so even an invalid body is a 404
        assert!(matches!(
            update_wish(&repo, bob, wish.id, WishPayload::default(), false).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            delete_wish(&repo, bob, wish.id).await,
            Err(ApiError::NotFound)
        ));
        assert!(list_wishes(&repo, bob, Pagination::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(get_wish(&repo, alice, wish.id).await.unwrap().title, "Bike");
    }

    #[tokio::test]
    async fn negative_pagination_is_rejected() {
        let repo = MemoryWishRepo::new();
        let err = list_wishes(
            &repo,
            Uuid::new_v4(),
            Pagination {
                limit: Some(-1),
                offset: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e.has("limit")));
    }
}
