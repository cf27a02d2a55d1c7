use crate::client::globalsettings::GlobalSettings;

pub fn command_cluster_list(gsettings: &GlobalSettings) -> anyhow::Result<()> {
    let catalog = gsettings.catalog()?;
    gsettings.printer().print_cluster_list(&catalog);
    Ok(())
}
