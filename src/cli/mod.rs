pub mod convert;
pub mod favorites;
pub mod history;
pub mod rates;
pub mod session;
pub mod setup;
pub mod ui;

use crate::core::{ConverterForm, RateProvider, RateRequest, RateUpdate};

/// Fetches rates for `request` behind a spinner and hands the outcome to the form.
pub async fn fetch_rates_for(
    form: &mut ConverterForm,
    provider: &dyn RateProvider,
    request: RateRequest,
) -> RateUpdate {
    let pb = ui::new_spinner(&format!("Fetching {} rates", request.base));
    let result = provider.fetch_rates(&request.base).await;
    pb.finish_and_clear();
    form.apply_rates(&request, result)
}
