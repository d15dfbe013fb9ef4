//! End-to-end extraction over saved listing snapshots
use async_trait::async_trait;
use std::cell::Cell;
use std::time::Duration;

use ml_listing_extractor::domain::{ExtractionStatus, OperationType, PropertyType};
use ml_listing_extractor::infrastructure::{
    ElementHandle, Navigator, PageError, PageHandle, PageResult,
};
use ml_listing_extractor::{ListingResolver, ParsingConfig, StaticPage};

const HOUSE_URL: &str =
    "https://casa.mercadolibre.com.mx/MLM-2345678901-casa-con-jardin-en-lomas-de-cortes-_JM";
const APARTMENT_URL: &str =
    "https://departamento.mercadolibre.com.mx/MLM-987654321-departamento-amueblado-_JM";

const HOUSE_EXPANDED: &str = include_str!("fixtures/house_expanded.html");
const APARTMENT_COLLAPSED: &str = include_str!("fixtures/apartment_collapsed.html");
const LAND_NO_SPECS: &str = include_str!("fixtures/land_no_specs.html");

fn resolver() -> ListingResolver {
    ListingResolver::new(&ParsingConfig::default()).unwrap()
}

#[tokio::test]
async fn expanded_house_listing_is_fully_resolved() {
    let page = StaticPage::new(HOUSE_URL, HOUSE_EXPANDED);
    let record = resolver().resolve(&page, None, false).await;

    assert_eq!(record.status, ExtractionStatus::Success);
    assert_eq!(record.error_message, None);
    assert_eq!(record.ml_id.as_deref(), Some("MLM-2345678901"));
    assert_eq!(record.title.as_deref(), Some("Casa con jardín en Lomas de Cortés"));
    assert_eq!(record.price, Some(2_550_000.0));
    assert_eq!(record.currency.as_deref(), Some("MXN"));
    assert_eq!(record.property_type, Some(PropertyType::House));
    assert_eq!(record.operation_type, Some(OperationType::Sale));
    assert_eq!(record.seller_name.as_deref(), Some("Inmobiliaria Sol"));

    assert_eq!(
        record.raw_address.as_deref(),
        Some("Calle Morelos 123, Lomas de Cortés, Cuernavaca, Morelos")
    );
    assert_eq!(record.country.as_deref(), Some("Mexico"));
    assert_eq!(record.state.as_deref(), Some("Morelos"));
    assert_eq!(record.city.as_deref(), Some("Cuernavaca"));

    // tables first, then the description for what they leave open
    assert_eq!(record.bedrooms, Some(3));
    assert_eq!(record.built_area_m2, Some(180.0));
    assert_eq!(record.lot_area_m2, Some(250.0));
    assert_eq!(record.bathrooms, Some(2.5));
    assert_eq!(record.parking_spaces, Some(2));

    let names: Vec<&str> = record.categories.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["principales", "servicios", "ambientes"]);
    let principal = record.categories.get("principales").unwrap();
    assert_eq!(principal.get("Recámaras").map(String::as_str), Some("3"));
    assert_eq!(principal.get("Antigüedad").map(String::as_str), Some("8 años"));

    assert!(record.raw_spec_table.is_none());
    assert!(record.elapsed_seconds.is_some());
    assert!(page.clicked().is_empty());
    assert_eq!(page.total_wait(), Duration::from_millis(1000));
}

#[tokio::test]
async fn collapsed_panel_is_expanded_before_reading_tables() {
    let page = StaticPage::new(APARTMENT_URL, APARTMENT_COLLAPSED);
    let record = resolver().resolve(&page, None, false).await;

    assert_eq!(page.clicked().len(), 1);
    assert_eq!(page.total_wait(), Duration::from_millis(4000));

    assert_eq!(record.status, ExtractionStatus::Success);
    assert_eq!(record.ml_id.as_deref(), Some("MLM-987654321"));
    assert_eq!(record.price, Some(1200.0));
    assert_eq!(record.currency.as_deref(), Some("USD"));
    assert_eq!(record.property_type, Some(PropertyType::Apartment));
    assert_eq!(record.operation_type, Some(OperationType::Rent));
    assert_eq!(record.seller_name, None);

    assert_eq!(record.raw_address.as_deref(), Some("Av. Universidad 1200, Coyoacán, CDMX"));
    assert_eq!(record.state.as_deref(), Some("Ciudad de México"));
    assert_eq!(record.city.as_deref(), Some("Coyoacán"));

    assert_eq!(record.categories.keys().collect::<Vec<_>>(), vec!["principales"]);
    assert_eq!(record.bedrooms, Some(2));
    assert_eq!(record.bathrooms, Some(1.0));
    assert_eq!(record.parking_spaces, Some(1));
    assert_eq!(record.lot_area_m2, Some(85.0));
    // small lot with no built area listed
    assert_eq!(record.built_area_m2, Some(63.75));
}

struct RecordingNavigator {
    calls: Cell<usize>,
}

#[async_trait(?Send)]
impl Navigator for RecordingNavigator {
    async fn expand_attribute_panel(&self, _page: &dyn PageHandle) -> PageResult<bool> {
        self.calls.set(self.calls.get() + 1);
        Ok(true)
    }
}

#[tokio::test]
async fn caller_navigator_replaces_builtin_expansion() {
    let page = StaticPage::new(APARTMENT_URL, APARTMENT_COLLAPSED);
    let navigator = RecordingNavigator { calls: Cell::new(0) };

    let record = resolver().resolve(&page, Some(&navigator), false).await;

    assert_eq!(navigator.calls.get(), 1);
    assert!(page.clicked().is_empty());
    assert_eq!(page.total_wait(), Duration::from_millis(1000));
    assert_eq!(record.bedrooms, Some(2));
}

#[tokio::test]
async fn listing_without_specifications_uses_description() {
    let page = StaticPage::new(
        "https://terreno.mercadolibre.com.mx/MLM-555-terreno",
        LAND_NO_SPECS,
    );
    let record = resolver().resolve(&page, None, true).await;

    assert_eq!(record.status, ExtractionStatus::Success);
    assert!(record.categories.is_empty());
    assert_eq!(record.property_type, Some(PropertyType::Land));
    assert_eq!(record.operation_type, Some(OperationType::Sale));
    assert_eq!(record.price, Some(950_000.0));
    assert_eq!(record.lot_area_m2, Some(600.0));
    assert_eq!(record.built_area_m2, None);
    assert_eq!(record.raw_address, None);
    assert_eq!(record.country.as_deref(), Some("Mexico"));

    let raw = record.raw_spec_table.unwrap();
    assert!(raw.is_empty());
    assert_eq!(raw.metadata.total_categories, 0);
}

#[tokio::test]
async fn raw_table_is_attached_on_request() {
    let page = StaticPage::new(HOUSE_URL, HOUSE_EXPANDED);
    let record = resolver().resolve(&page, None, true).await;

    let raw = record.raw_spec_table.as_ref().expect("raw table requested");
    assert_eq!(raw.metadata.total_categories, 3);
    assert_eq!(raw.metadata.total_fields, 8);
    assert!(raw.categories.contains_key("principales"));

    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("raw_spec_table").is_some());
}

#[tokio::test]
async fn empty_page_is_partial() {
    let page = StaticPage::new(
        "https://casa.mercadolibre.com.mx/MLM-1",
        "<html><body><p>Página no disponible</p></body></html>",
    );
    let record = resolver().resolve(&page, None, false).await;

    assert_eq!(record.status, ExtractionStatus::Partial);
    assert_eq!(record.error_message, None);
    assert!(record.categories.is_empty());
    assert_eq!(record.price, None);
    assert_eq!(record.property_type, Some(PropertyType::Unknown));
    assert_eq!(record.operation_type, Some(OperationType::Unknown));
}

/// Static page whose connection drops on the first selector containing `trigger`
struct DroppingPage {
    inner: StaticPage,
    trigger: &'static str,
}

impl DroppingPage {
    fn check(&self, selector: &str) -> PageResult<()> {
        if selector.contains(self.trigger) {
            return Err(PageError::Disconnected("target closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PageHandle for DroppingPage {
    async fn url(&self) -> PageResult<String> {
        self.inner.url().await
    }

    async fn title(&self) -> PageResult<Option<String>> {
        self.inner.title().await
    }

    async fn query_selector(&self, selector: &str) -> PageResult<Option<ElementHandle>> {
        self.check(selector)?;
        self.inner.query_selector(selector).await
    }

    async fn query_selector_all(&self, selector: &str) -> PageResult<Vec<ElementHandle>> {
        self.check(selector)?;
        self.inner.query_selector_all(selector).await
    }

    async fn query_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Option<ElementHandle>> {
        self.inner.query_within(scope, selector).await
    }

    async fn query_all_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Vec<ElementHandle>> {
        self.inner.query_all_within(scope, selector).await
    }

    async fn text_content(&self, element: ElementHandle) -> PageResult<Option<String>> {
        self.inner.text_content(element).await
    }

    async fn inner_text(&self, element: ElementHandle) -> PageResult<Option<String>> {
        self.inner.inner_text(element).await
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> PageResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn is_visible(&self, element: ElementHandle) -> PageResult<bool> {
        self.inner.is_visible(element).await
    }

    async fn click(&self, element: ElementHandle) -> PageResult<()> {
        self.inner.click(element).await
    }

    async fn evaluate(&self, script: &str) -> PageResult<serde_json::Value> {
        self.inner.evaluate(script).await
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<ElementHandle> {
        self.check(selector)?;
        self.inner.wait_for_selector(selector, timeout).await
    }

    async fn wait_for_timeout(&self, delay: Duration) {
        self.inner.wait_for_timeout(delay).await;
    }
}

#[tokio::test]
async fn lost_connection_keeps_fields_found_before_it() {
    let page = DroppingPage {
        inner: StaticPage::new(HOUSE_URL, HOUSE_EXPANDED),
        trigger: "technical-specifications",
    };
    let record = resolver().resolve(&page, None, false).await;

    assert_eq!(record.status, ExtractionStatus::Error);
    let message = record.error_message.as_deref().unwrap();
    assert!(message.contains("target closed"), "unexpected message: {message}");

    assert_eq!(record.price, Some(2_550_000.0));
    assert_eq!(record.property_type, Some(PropertyType::House));
    assert_eq!(record.city.as_deref(), Some("Cuernavaca"));
    assert!(record.categories.is_empty());
    assert_eq!(record.bedrooms, None);
    assert!(record.elapsed_seconds.is_some());
}

#[tokio::test]
async fn fault_after_metadata_keeps_exactly_those_fields() {
    let page = DroppingPage {
        inner: StaticPage::new(HOUSE_URL, HOUSE_EXPANDED),
        trigger: "fraction",
    };
    let record = resolver().resolve(&page, None, false).await;

    assert_eq!(record.status, ExtractionStatus::Error);
    assert!(record.error_message.is_some());
    assert_eq!(record.populated_field_count(), 3);
    assert_eq!(record.ml_id.as_deref(), Some("MLM-2345678901"));
    assert!(record.title.is_some());
    assert!(record.description.is_some());
    assert_eq!(record.price, None);
    assert_eq!(record.country, None);
}
