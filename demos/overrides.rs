use rust_decimal::Decimal;
use varigen::{Engine, VariantOverride};

fn main() {
    let engine = Engine::default();
    let expansion = engine
        .expand_prompt("S to L, siyah ve beyaz, fiyat 150, eski fiyat 200, stok 8")
        .expect("prompt should expand");

    for variant in &expansion.variants {
        println!("{variant}");
    }

    let first = expansion.variants[0].id.clone();
    let last = expansion.variants[expansion.variants.len() - 1].id.clone();

    // A merchant marks one variant down and sells out another.
    let edits = [
        VariantOverride::new(first).price(Decimal::new(12990, 2)),
        VariantOverride::new(last.clone()).stock(0),
    ];
    match engine.apply_overrides(expansion.variants.clone(), &edits) {
        Ok(variants) => {
            println!();
            for variant in &variants {
                println!("{variant}");
            }
        }
        Err(err) => println!("{err}"),
    }

    // An edit that breaks the compare-at invariant is rejected, not corrected.
    let bad = [VariantOverride::new(last).price(Decimal::from(250))];
    if let Err(err) = engine.apply_overrides(expansion.variants, &bad) {
        println!();
        println!("{err}");
    }
}
