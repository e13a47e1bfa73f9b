use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Recipes {
    Table,
    Key,
    Name,
    Diet,
    Calories,
    ProteinG,
    CarbsG,
    FatG,
}

#[derive(Iden, Clone)]
pub enum RecipeIngredients {
    Table,
    RecipeKey,
    IngredientName,
    Quantity,
}

#[derive(Iden, Clone)]
pub enum Ingredients {
    Table,
    Name,
    Quantity,
    Unit,
    Grams,
    Source,
}
