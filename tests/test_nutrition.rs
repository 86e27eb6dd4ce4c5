use receitas_nutri::{
    extract_main_ingredient, extract_quantity, CalculationMethod, DocumentStore,
    NutritionCalculator, Product, ProductCatalog, RecipeDetails, RecipeRepository, RecipeSection,
    RecipeStats,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const TABLE: &str = "\
nome;energia_kcal;carboidrato_total_g;proteina_g;lipidios_g;fibra_alimentar_g
Farinha, de trigo;360;75,1;9,8;1,4;2,3
Ovo, de galinha, inteiro, cru;143;1,6;13,0;8,9;NA
Ovo, de galinha, inteiro, frito;240;1,2;15,6;18,6;NA
Cenoura, crua;34;7,7;1,3;0,2;3,2
Bolo, de cenoura, com cobertura de chocolate;410;55;5;19;1
Leite, de vaca, integral;61;4,7;3,1;3,2;NA
Açúcar, refinado;387;99,5;0,3;tr;NA
";

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TABLE.as_bytes()).unwrap();
    file
}

fn recipe() -> RecipeDetails {
    RecipeDetails {
        id: "23-bolo-de-cenoura".to_string(),
        title: "Bolo de cenoura".to_string(),
        stats: RecipeStats {
            prepare_time_minutes: 40,
            portion_output: 12,
            favorites: 0,
        },
        ingredients: vec![
            RecipeSection {
                title: "Massa".to_string(),
                items: vec![
                    "3 cenouras médias".to_string(),
                    "4 ovos".to_string(),
                    "2 e 1/2 xícaras de farinha de trigo".to_string(),
                ],
            },
            RecipeSection {
                title: "Cobertura".to_string(),
                items: vec![
                    "1 xícara de açúcar".to_string(),
                    "canela a gosto".to_string(),
                ],
            },
        ],
        instructions: Vec::new(),
    }
}

fn calculator(catalog: &NamedTempFile, store: Arc<DocumentStore>) -> NutritionCalculator {
    NutritionCalculator::builder()
        .products(Arc::new(ProductCatalog::from_path(catalog.path(), 20).unwrap()))
        .recipes(store)
        .concurrency(3)
        .build()
        .unwrap()
}

#[test]
fn test_quantity_examples() {
    assert_eq!(extract_quantity("4 ovos"), 200.0);
    assert_eq!(extract_quantity("1/2 xícara"), 60.0);
    assert_eq!(extract_quantity("2 e 1/2 xícaras"), 300.0);
    assert_eq!(extract_quantity("a gosto"), 1.0);
    assert_eq!(extract_quantity("sal"), 20.0);
    assert_eq!(extract_main_ingredient("4 ovos"), "ovo");
}

#[tokio::test]
async fn test_totals_are_sum_of_contributions() {
    let catalog = catalog_file();
    let calculator = calculator(&catalog, Arc::new(DocumentStore::in_memory()));

    let nutrition = calculator.get_recipe_nutrition(&recipe(), false).await.unwrap();

    let mut calories = 0.0;
    let mut carbs = 0.0;
    for ingredient in &nutrition.ingredients {
        calories += ingredient.nutrition_contribution.calories;
        carbs += ingredient.nutrition_contribution.carbs;
        assert_eq!(
            ingredient.matched_product.is_none(),
            ingredient.nutrition_contribution.is_zero()
        );
    }
    assert!((nutrition.totals.calories - calories).abs() < 1e-9);
    assert!((nutrition.totals.carbs - carbs).abs() < 1e-9);

    assert_eq!(nutrition.portion_output, 12);
    assert_eq!(nutrition.per_serving.calories, nutrition.totals.calories / 12.0);
    assert_eq!(nutrition.per_serving.fat, nutrition.totals.fat / 12.0);
}

#[tokio::test]
async fn test_each_line_matches_a_raw_product() {
    let catalog = catalog_file();
    let calculator = calculator(&catalog, Arc::new(DocumentStore::in_memory()));

    let nutrition = calculator.calculate(&recipe()).await;
    let names: Vec<Option<&str>> = nutrition
        .ingredients
        .iter()
        .map(|i| i.matched_product.as_ref().map(|p| p.name.as_str()))
        .collect();

    assert_eq!(
        names,
        vec![
            Some("Cenoura, crua"),
            Some("Ovo, de galinha, inteiro, cru"),
            Some("Farinha, de trigo"),
            Some("Açúcar, refinado"),
            None,
        ]
    );
    assert_eq!(nutrition.ingredients[2].estimated_quantity, 300.0);
    assert_eq!(nutrition.ingredients[4].estimated_quantity, 1.0);
}

#[tokio::test]
async fn test_repeated_calls_are_stable_across_reopen() {
    let catalog = catalog_file();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let first = {
        let store = Arc::new(DocumentStore::open(&path).await.unwrap());
        store.save_recipe(&recipe()).await.unwrap();
        calculator(&catalog, store)
            .get_recipe_nutrition(&recipe(), true)
            .await
            .unwrap()
    };

    let store = Arc::new(DocumentStore::open(&path).await.unwrap());
    let second = calculator(&catalog, store.clone())
        .get_recipe_nutrition(&recipe(), true)
        .await
        .unwrap();

    assert_eq!(first.calculation_method, CalculationMethod::Calculated);
    assert_eq!(second.calculation_method, CalculationMethod::Stored);
    assert_eq!(first.totals, second.totals);
    assert_eq!(first.per_serving, second.per_serving);
    // The recipe document survived the nutrition save
    assert_eq!(store.get_recipe(&recipe().id).await.unwrap(), Some(recipe()));
}

#[tokio::test]
async fn test_substitution_changes_only_one_ingredient() {
    let catalog = catalog_file();
    let store = Arc::new(DocumentStore::in_memory());
    let calculator = calculator(&catalog, store.clone());

    let mut recipe = recipe();
    recipe.ingredients.truncate(1);
    let before = calculator.get_recipe_nutrition(&recipe, true).await.unwrap();
    assert_eq!(before.ingredients.len(), 3);

    let quail_eggs = Product {
        name: "Ovo, de codorna, inteiro, cru".to_string(),
        calories: 177.0,
        carbs: 0.8,
        protein: 13.7,
        fat: 12.7,
        fiber: 0.0,
    };
    let after = calculator
        .substitute_ingredient(&before, 1, quail_eggs.clone(), true)
        .await
        .unwrap();

    let old = before.ingredients[1].nutrition_contribution;
    let new = after.ingredients[1].nutrition_contribution;
    assert_eq!(new.calories, 354.0);
    assert!((after.totals.calories - (before.totals.calories - old.calories + new.calories)).abs() < 1e-9);
    assert!((after.totals.protein - (before.totals.protein - old.protein + new.protein)).abs() < 1e-9);

    assert_eq!(after.ingredients[0], before.ingredients[0]);
    assert_eq!(after.ingredients[2], before.ingredients[2]);
    assert_eq!(after.ingredients[1].matched_product, Some(quail_eggs));
    assert_eq!(after.ingredients[1].estimated_quantity, before.ingredients[1].estimated_quantity);
    assert_eq!(after.calculation_method, CalculationMethod::Calculated);

    let reread = calculator.get_recipe_nutrition(&recipe, true).await.unwrap();
    assert_eq!(reread.calculation_method, CalculationMethod::Stored);
    assert_eq!(reread.totals, after.totals);
}

#[tokio::test]
async fn test_substitution_survives_refresh_after_reopen() {
    let catalog = catalog_file();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let brown_sugar = Product {
        name: "Açúcar, mascavo".to_string(),
        calories: 369.0,
        carbs: 94.5,
        protein: 0.8,
        fat: 0.1,
        fiber: 0.0,
    };

    let substituted = {
        let store = Arc::new(DocumentStore::open(&path).await.unwrap());
        let calculator = calculator(&catalog, store);
        let nutrition = calculator.get_recipe_nutrition(&recipe(), true).await.unwrap();
        calculator
            .substitute_ingredient(&nutrition, 3, brown_sugar.clone(), true)
            .await
            .unwrap()
    };

    let store = Arc::new(DocumentStore::open(&path).await.unwrap());
    let refreshed = calculator(&catalog, store)
        .recalculate(&recipe(), true)
        .await
        .unwrap();

    assert_eq!(refreshed.calculation_method, CalculationMethod::Calculated);
    assert_eq!(refreshed.ingredients[3].matched_product, Some(brown_sugar));
    assert_eq!(refreshed.ingredients[3].original_text, "1 xícara de açúcar");
    assert_eq!(refreshed.totals, substituted.totals);
}
