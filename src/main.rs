use library_circulation::{
    adapters::{clock::SystemClock, memory::MemoryRecordStore},
    api::{handlers::AppState, router::create_router},
    application::circulation::ServiceDependencies,
    domain::{Book, Reader, ReaderCode},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_circulation=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize adapters
    // The record store lives for the whole process; book and reader
    // management flows are external, so a small catalog is seeded here.
    let record_store = Arc::new(MemoryRecordStore::new());
    seed_catalog(&record_store);
    let clock = Arc::new(SystemClock);

    // Create service dependencies
    let service_deps = ServiceDependencies::new(record_store, clock);

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

/// Seed a small branch-library catalog so the service is usable out of
/// the box. Real catalog management happens outside this system.
fn seed_catalog(store: &MemoryRecordStore) {
    let books = [
        ("The Left Hand of Darkness", "Science Fiction"),
        ("A Wizard of Earthsea", "Fantasy"),
        ("The Dispossessed", "Science Fiction"),
        ("Kokoro", "Fiction"),
        ("Snow Country", "Fiction"),
        ("The Pillow Book", "Classics"),
        ("A Brief History of Time", "Science"),
    ];
    for &(title, category) in &books {
        store.add_book(Book::new(title, category));
    }

    let readers = [
        ("Sato Hanako", "R-0001"),
        ("Tanaka Jiro", "R-0002"),
        ("Kimura Yui", "R-0003"),
    ];
    for &(full_name, code) in &readers {
        store.add_reader(Reader::new(full_name, ReaderCode::new(code)));
    }

    tracing::info!(
        books = books.len(),
        readers = readers.len(),
        "seeded catalog"
    );
}
