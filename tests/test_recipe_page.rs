use receitas_nutri::{extract_recipe, extract_search_results, RecipeError};

const RECIPE_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Bolo de cenoura | TudoGostoso</title>
    <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "BreadcrumbList", "itemListElement": []}
    </script>
    <script type="application/ld+json">
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": "Bolo de cenoura",
        "prepTime": "PT40M",
        "recipeYield": "12 porções",
        "recipeIngredient": ["3 cenouras", "4 ovos"]
    }
    </script>
</head>
<body>
    <header><h1>TudoGostoso</h1></header>
    <main>
        <div class="recipe-title"><h1>
            Bolo de cenoura
            fofinho
        </h1></div>
        <div class="recipe-section recipe-ingredients">
            <h3 class="recipe-ingredients-subtitle">Massa</h3>
            <div class="recipe-ingredients-item-wrapper">
                <span class="recipe-ingredients-item-label">3 cenouras médias raladas</span>
            </div>
            <div class="recipe-ingredients-item-wrapper">
                <span class="recipe-ingredients-item-label">4 ovos</span>
            </div>
            <div class="recipe-ingredients-item-wrapper">
                <span class="recipe-ingredients-item-label">2 e 1/2 xícaras de farinha de trigo</span>
            </div>
            <h3 class="recipe-ingredients-subtitle">Cobertura</h3>
            <div class="recipe-ingredients-item-wrapper">
                <span class="recipe-ingredients-item-label">1 colher (sopa) de manteiga</span>
            </div>
            <div class="recipe-ingredients-item-wrapper">
                <span class="recipe-ingredients-item-label">chocolate em pó a gosto</span>
            </div>
        </div>
        <ol>
            <li class="recipe-steps-item">
                <h4 class="recipe-steps-title">Massa</h4>
                <p class="recipe-steps-text">Bata as cenouras e os ovos no liquidificador.</p>
            </li>
            <li class="recipe-steps-item">
                <p class="recipe-steps-text">Misture a farinha e asse por 40 minutos.</p>
            </li>
            <li class="recipe-steps-item">
                <h4 class="recipe-steps-title">Cobertura</h4>
                <p class="recipe-steps-text">Derreta a manteiga com o chocolate.</p>
            </li>
        </ol>
    </main>
</body>
</html>
"#;

#[test]
fn test_full_recipe_page() {
    let recipe = extract_recipe(RECIPE_PAGE).unwrap();

    assert_eq!(recipe.title, "Bolo de cenoura fofinho");
    assert_eq!(recipe.stats.prepare_time_minutes, 40);
    assert_eq!(recipe.stats.portion_output, 12);
    assert_eq!(recipe.stats.favorites, 0);

    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[0].title, "Massa");
    assert_eq!(
        recipe.ingredients[0].items,
        vec![
            "3 cenouras médias raladas",
            "4 ovos",
            "2 e 1/2 xícaras de farinha de trigo"
        ]
    );
    assert_eq!(recipe.ingredients[1].title, "Cobertura");
    assert_eq!(recipe.ingredients[1].items.len(), 2);

    assert_eq!(recipe.instructions.len(), 2);
    assert_eq!(recipe.instructions[0].title, "Massa");
    assert_eq!(recipe.instructions[0].items.len(), 2);
    assert_eq!(
        recipe.instructions[1].items,
        vec!["Derreta a manteiga com o chocolate."]
    );
}

#[test]
fn test_page_without_ingredients_container() {
    let html = r#"
    <html><body>
        <h1>Arroz simples</h1>
        <li class="recipe-steps-item"><p class="recipe-steps-text">Refogue o arroz.</p></li>
    </body></html>
    "#;
    let recipe = extract_recipe(html).unwrap();
    assert_eq!(recipe.title, "Arroz simples");
    assert!(recipe.ingredients.is_empty());
    assert_eq!(recipe.instructions[0].title, "Modo de Preparo");
    assert_eq!(recipe.stats.portion_output, 1);
}

#[test]
fn test_redirected_page_is_not_found() {
    let html = r#"<html><body><a href="/">You are being redirected</a></body></html>"#;
    let err = extract_recipe(html).unwrap_err();
    assert!(matches!(err, RecipeError::NotFound));
    assert_eq!(err.code(), 400);
    assert_eq!(err.to_string(), "recipe not found");
}

#[test]
fn test_search_page() {
    let html = r#"
    <html><body>
        <div class="card-recipe">
            <a class="card-link" href="https://www.tudogostoso.com.br/receita/23-bolo-de-cenoura.html">
                Bolo de cenoura
            </a>
        </div>
        <div class="card-recipe">
            <a class="card-link" href="/receita/111-bolo-de-cenoura-com-chocolate.html">Bolo de cenoura com chocolate</a>
        </div>
    </body></html>
    "#;
    let results = extract_search_results(html, 5).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Bolo de cenoura");
    assert_eq!(results[0].id, "23-bolo-de-cenoura");
    assert_eq!(results[1].id, "111-bolo-de-cenoura-com-chocolate");
}

#[test]
fn test_search_page_without_results() {
    let html = r#"<html><body><p class="no-results">Não encontramos receitas</p></body></html>"#;
    let err = extract_search_results(html, 5).unwrap_err();
    assert!(matches!(err, RecipeError::NoResults));
    assert_eq!(err.to_string(), "no recipes found");
}
