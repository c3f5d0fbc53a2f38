use varigen::Engine;

fn main() {
    let engine = Engine::default();

    let prompt = std::env::args().nth(1).unwrap_or_else(|| {
        "S'den XL'e kadar kırmızı ve mavi, fiyat 200 TL, XL ve üzeri %10 zam, stok 10".to_owned()
    });

    let rule_set = engine.parse(&prompt);
    println!("{rule_set}");

    match engine.expand(&rule_set) {
        Ok(variants) => {
            for variant in &variants {
                println!("{variant}");
            }
        }
        Err(problems) => println!("{problems}"),
    }

    println!();
    println!("{}", engine.build_detailed(&rule_set));
}
