#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    voucher_desk::run().await
}
