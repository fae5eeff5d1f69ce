#![allow(non_snake_case)]

use SpotterLibrary::detection::manager::Spotter;

#[actix_web::main]
async fn main() {
    Spotter::run().await;
    Spotter::terminate().await;
}
