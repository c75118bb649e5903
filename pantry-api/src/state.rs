use pantry_order::OrderProcessor;

#[derive(Clone)]
pub struct AppState {
    pub processor: OrderProcessor,
}
